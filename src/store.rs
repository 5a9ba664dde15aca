//! The application's tables, shared by every module.

use staybnb_db::Table;

use crate::modules::{
    bookings::models::Booking,
    reviews::models::{Review, ReviewImage},
    spots::models::{Spot, SpotImage},
    users::models::User,
};

#[derive(Clone)]
pub struct Store {
    pub users: Table<User>,
    pub spots: Table<Spot>,
    pub spot_images: Table<SpotImage>,
    pub reviews: Table<Review>,
    pub review_images: Table<ReviewImage>,
    pub bookings: Table<Booking>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            users: Table::new("users"),
            spots: Table::new("spots"),
            spot_images: Table::new("spot_images"),
            reviews: Table::new("reviews"),
            review_images: Table::new("review_images"),
            bookings: Table::new("bookings"),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
