use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use staybnb_db::RecordId;
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::users::models::OwnerContact;

/// A rentable listing owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spot {
    /// Overwrite the editable fields from validated input.
    pub fn apply(&mut self, input: SpotInput) {
        self.address = input.address;
        self.city = input.city;
        self.state = input.state;
        self.country = input.country;
        self.lat = input.lat;
        self.lng = input.lng;
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.updated_at = Utc::now();
    }
}

/// Body of spot create and edit requests.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SpotInput {
    #[validate(length(min = 1, message = "Street address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude is not valid"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude is not valid"))]
    pub lng: f64,
    #[validate(length(min = 1, max = 50, message = "Name must be less than 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price per day is required"))]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotImage {
    pub id: RecordId,
    pub spot_id: RecordId,
    pub url: String,
    pub preview: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewSpotImage {
    #[validate(url(message = "Image URL is not valid"))]
    pub url: String,
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpotImageView {
    pub id: RecordId,
    pub url: String,
    pub preview: bool,
}

impl From<&SpotImage> for SpotImageView {
    fn from(image: &SpotImage) -> Self {
        Self {
            id: image.id,
            url: image.url.clone(),
            preview: image.preview,
        }
    }
}

/// A spot as it appears in listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotListing {
    #[serde(flatten)]
    pub spot: Spot,
    pub avg_rating: Option<f64>,
    pub preview_image: Option<String>,
}

/// Unpaginated spot listing, e.g. the caller's own spots.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpotsList {
    #[serde(rename = "Spots")]
    pub spots: Vec<SpotListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpotsPage {
    #[serde(rename = "Spots")]
    pub spots: Vec<SpotListing>,
    pub page: u32,
    pub size: u32,
}

/// Full spot detail with images, owner and review aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotDetail {
    #[serde(flatten)]
    pub spot: Spot,
    pub num_rating: usize,
    pub avg_star_rating: Option<f64>,
    #[serde(rename = "SpotImages")]
    pub spot_images: Vec<SpotImageView>,
    #[serde(rename = "Owner")]
    pub owner: Option<OwnerContact>,
}
