use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use staybnb_authz::ensure_owner;
use staybnb_db::RecordId;
use staybnb_http::{AppError, CurrentUser};
use validator::Validate;

use super::models::{
    NewReviewImage, Review, ReviewImage, ReviewImageView, ReviewInput, ReviewList, ReviewView,
};
use crate::{modules::users, store::Store};

async fn with_authors(store: &Store, reviews: Vec<Review>) -> ReviewList {
    let authors = users::summaries(store, reviews.iter().map(|r| r.user_id)).await;

    let mut images: HashMap<RecordId, Vec<ReviewImageView>> = HashMap::new();
    for image in store.review_images.all().await {
        images
            .entry(image.review_id)
            .or_default()
            .push(ReviewImageView::from(&image));
    }

    let reviews = reviews
        .into_iter()
        .map(|review| ReviewView {
            user: authors.get(&review.user_id).cloned(),
            images: images.remove(&review.id).unwrap_or_default(),
            review,
        })
        .collect();
    ReviewList { reviews }
}

fn review_not_found() -> AppError {
    AppError::not_found("Review couldn't be found")
}

async fn find_review(store: &Store, review_id: RecordId) -> Result<Review, AppError> {
    store.reviews.get(review_id).await.ok_or_else(review_not_found)
}

pub async fn list_for_spot(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
) -> Result<Json<ReviewList>, AppError> {
    if store.spots.get(spot_id).await.is_none() {
        return Err(AppError::not_found("Spot couldn't be found"));
    }

    let reviews = store.reviews.scan(|r| r.spot_id == spot_id).await;
    Ok(Json(with_authors(&store, reviews).await))
}

pub async fn create_for_spot(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let author = users::require_registered(&store, current).await?;

    // held until the review commits so a concurrent spot delete cascades over it
    let spots = store.spots.read().await;
    if spots.get(spot_id).is_none() {
        return Err(AppError::not_found("Spot couldn't be found"));
    }
    input.validate()?;

    let review = store
        .reviews
        .transaction(|tx| {
            let already = tx.scan(|r| r.spot_id == spot_id && r.user_id == author.id);
            if let Some(existing) = already.first() {
                return Err(AppError::conflict(
                    vec![json!({
                        "field": "spotId",
                        "error": "already reviewed",
                        "reviewId": existing.id,
                    })],
                    "User already has a review for this spot",
                ));
            }

            let now = Utc::now();
            Ok(tx.insert(|id| Review {
                id,
                user_id: author.id,
                spot_id,
                review: input.review,
                stars: input.stars,
                created_at: now,
                updated_at: now,
            }))
        })
        .await?;
    drop(spots);

    tracing::info!(
        review_id = %review.id,
        spot_id = %spot_id,
        user_id = %author.id,
        stars = review.stars,
        "review created"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn current(State(store): State<Store>, current: CurrentUser) -> Json<ReviewList> {
    let reviews = store.reviews.scan(|r| r.user_id == current.id).await;
    Json(with_authors(&store, reviews).await)
}

pub async fn edit(
    State(store): State<Store>,
    Path(review_id): Path<RecordId>,
    current: CurrentUser,
    Json(input): Json<ReviewInput>,
) -> Result<Json<Review>, AppError> {
    let review = find_review(&store, review_id).await?;
    ensure_owner("edit a review", &review.user_id, &current.id)?;
    input.validate()?;

    let updated = store
        .reviews
        .update(review_id, |review| {
            review.review = input.review;
            review.stars = input.stars;
            review.updated_at = Utc::now();
            review.clone()
        })
        .await
        .ok_or_else(review_not_found)?;

    Ok(Json(updated))
}

pub async fn remove(
    State(store): State<Store>,
    Path(review_id): Path<RecordId>,
    current: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let review = find_review(&store, review_id).await?;
    ensure_owner("delete a review", &review.user_id, &current.id)?;

    store.reviews.delete(review_id).await;
    let images = store
        .review_images
        .delete_where(|image| image.review_id == review_id)
        .await;

    tracing::info!(%review_id, images, "review deleted");
    Ok(Json(json!({ "message": "Successfully deleted" })))
}

pub async fn add_image(
    State(store): State<Store>,
    Path(review_id): Path<RecordId>,
    current: CurrentUser,
    Json(input): Json<NewReviewImage>,
) -> Result<(StatusCode, Json<ReviewImageView>), AppError> {
    // a review delete waits for this insert, then sweeps the new image too
    let reviews = store.reviews.read().await;
    let review = reviews.get(review_id).ok_or_else(review_not_found)?;
    ensure_owner("add an image to a review", &review.user_id, &current.id)?;
    input.validate()?;

    let image = store
        .review_images
        .insert(|id| ReviewImage {
            id,
            review_id,
            url: input.url,
            created_at: Utc::now(),
        })
        .await;
    drop(reviews);

    tracing::info!(image_id = %image.id, %review_id, "review image added");
    Ok((StatusCode::CREATED, Json(ReviewImageView::from(&image))))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testutils::TestApp;

    async fn setup() -> (TestApp, u64, u64) {
        let app = TestApp::new();
        let owner = app.register("owner1", "owner@example.com").await;
        let guest = app.register("guest1", "guest@example.com").await;
        let spot = app.create_spot(owner, "Cabin", 120.0).await;
        (app, guest, spot)
    }

    #[tokio::test]
    async fn review_is_listed_with_author() {
        let (app, guest, spot) = setup().await;
        let uri = format!("/api/spots/{spot}/reviews");

        let (status, body) = app
            .post(&uri, Some(guest), json!({ "review": "Great stay", "stars": 4 }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["spotId"], spot);
        assert_eq!(body["userId"], guest);

        let (status, body) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Reviews"][0]["review"], "Great stay");
        assert_eq!(body["Reviews"][0]["User"]["lastName"], "guest1");

        let (_, body) = app.get(&format!("/api/spots/{spot}"), None).await;
        assert_eq!(body["numRating"], 1);
        assert_eq!(body["avgStarRating"], 4.0);
    }

    #[tokio::test]
    async fn second_review_of_same_spot_conflicts() {
        let (app, guest, spot) = setup().await;
        let uri = format!("/api/spots/{spot}/reviews");
        let body = json!({ "review": "Nice", "stars": 5 });

        app.post(&uri, Some(guest), body.clone()).await;
        let (status, body) = app.post(&uri, Some(guest), body).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "conflict");
        assert_eq!(app.store.reviews.len().await, 1);
    }

    #[tokio::test]
    async fn invalid_review_is_rejected() {
        let (app, guest, spot) = setup().await;
        let uri = format!("/api/spots/{spot}/reviews");

        let (status, _) = app
            .post(&uri, Some(guest), json!({ "review": "Bad", "stars": 6 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .post(&uri, Some(guest), json!({ "review": "", "stars": 3 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .post(&uri, Some(guest), json!({ "review": "x".repeat(801), "stars": 3 }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .post("/api/spots/999/reviews", Some(guest), json!({ "review": "Hi", "stars": 3 }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn only_author_edits_and_deletes() {
        let (app, guest, spot) = setup().await;
        let other = app.register("other1", "other@example.com").await;

        let (_, created) = app
            .post(
                &format!("/api/spots/{spot}/reviews"),
                Some(guest),
                json!({ "review": "Okay", "stars": 3 }),
            )
            .await;
        let uri = format!("/api/reviews/{}", created["id"]);

        let (status, _) = app
            .put(&uri, Some(other), json!({ "review": "Hijacked", "stars": 1 }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .put(&uri, Some(guest), json!({ "review": "Better on reflection", "stars": 4 }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stars"], 4);

        let (status, body) = app.get("/api/reviews/current", Some(guest)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Reviews"][0]["review"], "Better on reflection");

        let (status, _) = app.delete(&uri, Some(other)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.delete(&uri, Some(guest)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully deleted");

        let (status, _) = app.delete(&uri, Some(guest)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn author_attaches_images_shown_in_listings() {
        let (app, guest, spot) = setup().await;
        let other = app.register("other1", "other@example.com").await;

        let (_, created) = app
            .post(
                &format!("/api/spots/{spot}/reviews"),
                Some(guest),
                json!({ "review": "Lovely view", "stars": 5 }),
            )
            .await;
        let review = created["id"].as_u64().unwrap();
        let uri = format!("/api/reviews/{review}/images");
        let image = json!({ "url": "https://img.example.com/view.png" });

        let (status, _) = app.post(&uri, Some(other), image.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.post(&uri, Some(guest), image).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["url"], "https://img.example.com/view.png");
        assert!(body.get("reviewId").is_none());

        let (status, _) = app
            .post(&uri, Some(guest), json!({ "url": "not a url" }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = app
            .post(
                "/api/reviews/999/images",
                Some(guest),
                json!({ "url": "https://img.example.com/x.png" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.get(&format!("/api/spots/{spot}/reviews"), None).await;
        let images = body["Reviews"][0]["ReviewImages"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0]["url"], "https://img.example.com/view.png");

        let (_, body) = app.get("/api/reviews/current", Some(guest)).await;
        assert_eq!(body["Reviews"][0]["ReviewImages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_review_removes_its_images() {
        let (app, guest, spot) = setup().await;
        let (_, created) = app
            .post(
                &format!("/api/spots/{spot}/reviews"),
                Some(guest),
                json!({ "review": "Fine", "stars": 3 }),
            )
            .await;
        let review = created["id"].as_u64().unwrap();

        app.post(
            &format!("/api/reviews/{review}/images"),
            Some(guest),
            json!({ "url": "https://img.example.com/a.png" }),
        )
        .await;
        assert_eq!(app.store.review_images.len().await, 1);

        let (status, _) = app.delete(&format!("/api/reviews/{review}"), Some(guest)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(app.store.review_images.is_empty().await);
    }
}
