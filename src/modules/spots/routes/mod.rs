use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
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
    NewSpotImage, Spot, SpotDetail, SpotImage, SpotImageView, SpotInput, SpotListing, SpotsList,
    SpotsPage,
};
use super::query::SpotQuery;
use super::rating::average_rating;
use crate::{modules::users, store::Store};

fn spot_not_found() -> AppError {
    AppError::not_found("Spot couldn't be found")
}

async fn find_spot(store: &Store, spot_id: RecordId) -> Result<Spot, AppError> {
    store.spots.get(spot_id).await.ok_or_else(spot_not_found)
}

/// Attach rating and preview image to each spot.
async fn listings(store: &Store, spots: Vec<Spot>) -> Vec<SpotListing> {
    let mut stars: HashMap<RecordId, Vec<u8>> = HashMap::new();
    for review in store.reviews.all().await {
        stars.entry(review.spot_id).or_default().push(review.stars);
    }

    // later ids are newer, so the last preview image per spot wins
    let mut previews: HashMap<RecordId, String> = HashMap::new();
    for image in store.spot_images.scan(|image| image.preview).await {
        previews.insert(image.spot_id, image.url);
    }

    spots
        .into_iter()
        .map(|spot| SpotListing {
            avg_rating: stars
                .get(&spot.id)
                .and_then(|stars| average_rating(stars.iter().copied())),
            preview_image: previews.get(&spot.id).cloned(),
            spot,
        })
        .collect()
}

pub async fn list(
    State(store): State<Store>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<SpotsPage>, AppError> {
    query.validate()?;

    let spots: Vec<Spot> = store
        .spots
        .scan(|spot| query.matches(spot))
        .await
        .into_iter()
        .skip(query.offset())
        .take(query.size() as usize)
        .collect();

    Ok(Json(SpotsPage {
        spots: listings(&store, spots).await,
        page: query.page(),
        size: query.size(),
    }))
}

pub async fn list_current(State(store): State<Store>, current: CurrentUser) -> Json<SpotsList> {
    let spots = store.spots.scan(|spot| spot.owner_id == current.id).await;
    Json(SpotsList {
        spots: listings(&store, spots).await,
    })
}

pub async fn detail(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
) -> Result<Json<SpotDetail>, AppError> {
    let spot = find_spot(&store, spot_id).await?;

    let stars: Vec<u8> = store
        .reviews
        .scan(|review| review.spot_id == spot_id)
        .await
        .iter()
        .map(|review| review.stars)
        .collect();

    let spot_images = store
        .spot_images
        .scan(|image| image.spot_id == spot_id)
        .await
        .iter()
        .map(SpotImageView::from)
        .collect();

    let owner = store.users.get(spot.owner_id).await.as_ref().map(Into::into);

    Ok(Json(SpotDetail {
        num_rating: stars.len(),
        avg_star_rating: average_rating(stars),
        spot_images,
        owner,
        spot,
    }))
}

pub async fn create(
    State(store): State<Store>,
    current: CurrentUser,
    Json(input): Json<SpotInput>,
) -> Result<(StatusCode, Json<Spot>), AppError> {
    let owner = users::require_registered(&store, current).await?;
    input.validate()?;

    let now = Utc::now();
    let spot = store
        .spots
        .insert(|id| Spot {
            id,
            owner_id: owner.id,
            address: input.address,
            city: input.city,
            state: input.state,
            country: input.country,
            lat: input.lat,
            lng: input.lng,
            name: input.name,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
        })
        .await;

    tracing::info!(spot_id = %spot.id, owner_id = %spot.owner_id, "spot created");
    Ok((StatusCode::CREATED, Json(spot)))
}

pub async fn edit(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
    Json(input): Json<SpotInput>,
) -> Result<Json<Spot>, AppError> {
    let spot = find_spot(&store, spot_id).await?;
    ensure_owner("edit a spot", &spot.owner_id, &current.id)?;
    input.validate()?;

    let updated = store
        .spots
        .update(spot_id, |spot| {
            spot.apply(input);
            spot.clone()
        })
        .await
        .ok_or_else(spot_not_found)?;

    tracing::info!(spot_id = %spot_id, "spot updated");
    Ok(Json(updated))
}

pub async fn remove(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
) -> Result<Json<Value>, AppError> {
    let spot = find_spot(&store, spot_id).await?;
    ensure_owner("delete a spot", &spot.owner_id, &current.id)?;

    // The spot goes first. Writers of dependent rows hold the spot read-locked
    // until they commit, so everything swept below is complete.
    store.spots.delete(spot_id).await;
    let images = store.spot_images.delete_where(|i| i.spot_id == spot_id).await;

    let review_ids: HashSet<RecordId> = store
        .reviews
        .scan(|r| r.spot_id == spot_id)
        .await
        .iter()
        .map(|r| r.id)
        .collect();
    let reviews = store.reviews.delete_where(|r| r.spot_id == spot_id).await;
    store
        .review_images
        .delete_where(|i| review_ids.contains(&i.review_id))
        .await;

    let bookings = store.bookings.delete_where(|b| b.spot_id == spot_id).await;

    tracing::info!(%spot_id, images, reviews, bookings, "spot deleted");
    Ok(Json(json!({ "message": "Successfully deleted" })))
}

pub async fn add_image(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
    Json(input): Json<NewSpotImage>,
) -> Result<(StatusCode, Json<SpotImageView>), AppError> {
    let spots = store.spots.read().await;
    let spot = spots.get(spot_id).ok_or_else(spot_not_found)?;
    ensure_owner("add an image to a spot", &spot.owner_id, &current.id)?;
    input.validate()?;

    let image = store
        .spot_images
        .insert(|id| SpotImage {
            id,
            spot_id,
            url: input.url,
            preview: input.preview,
            created_at: Utc::now(),
        })
        .await;
    drop(spots);

    Ok((StatusCode::CREATED, Json(SpotImageView::from(&image))))
}
