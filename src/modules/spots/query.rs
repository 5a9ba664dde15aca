use serde::Deserialize;
use validator::Validate;

use super::models::Spot;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 20;

/// Listing filters and pagination from the query string.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpotQuery {
    #[validate(range(min = 1, max = 10, message = "Page must be between 1 and 10"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 20, message = "Size must be between 1 and 20"))]
    pub size: Option<u32>,
    #[validate(range(min = -90.0, max = 90.0, message = "Minimum latitude is invalid"))]
    pub min_lat: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "Maximum latitude is invalid"))]
    pub max_lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Minimum longitude is invalid"))]
    pub min_lng: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Maximum longitude is invalid"))]
    pub max_lng: Option<f64>,
    #[validate(range(min = 0.0, message = "Minimum price must be greater than or equal to 0"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "Maximum price must be greater than or equal to 0"))]
    pub max_price: Option<f64>,
}

impl SpotQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_SIZE)
    }

    /// Rows to skip before the requested page.
    pub fn offset(&self) -> usize {
        ((self.page() - 1) * self.size()) as usize
    }

    pub fn matches(&self, spot: &Spot) -> bool {
        fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
            min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
        }

        within(spot.lat, self.min_lat, self.max_lat)
            && within(spot.lng, self.min_lng, self.max_lng)
            && within(spot.price, self.min_price, self.max_price)
    }
}
