use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use staybnb_db::RecordId;
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::users::models::UserSummary;

/// A guest's star rating and comment on a spot. One per user per spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: RecordId,
    pub user_id: RecordId,
    pub spot_id: RecordId,
    pub review: String,
    pub stars: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewInput {
    #[validate(length(min = 1, max = 800, message = "Review text is required"))]
    pub review: String,
    #[validate(range(min = 1, max = 5, message = "Stars must be an integer from 1 to 5"))]
    pub stars: u8,
}

/// Photo attached to a review by its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewImage {
    pub id: RecordId,
    pub review_id: RecordId,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewReviewImage {
    #[validate(url(message = "Image URL is not valid"))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewImageView {
    pub id: RecordId,
    pub url: String,
}

impl From<&ReviewImage> for ReviewImageView {
    fn from(image: &ReviewImage) -> Self {
        Self {
            id: image.id,
            url: image.url.clone(),
        }
    }
}

/// A review with its author and images, as listed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    #[serde(rename = "User")]
    pub user: Option<UserSummary>,
    #[serde(rename = "ReviewImages")]
    pub images: Vec<ReviewImageView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewList {
    #[serde(rename = "Reviews")]
    pub reviews: Vec<ReviewView>,
}
