use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use staybnb_db::RecordId;
use utoipa::ToSchema;

use super::conflict::DateRange;
use crate::modules::users::models::UserSummary;

/// A reservation of a spot for an inclusive range of calendar dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: RecordId,
    pub spot_id: RecordId,
    pub user_id: RecordId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// What a non-owner may see of someone else's booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookedDates {
    pub spot_id: RecordId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Booking> for BookedDates {
    fn from(booking: &Booking) -> Self {
        Self {
            spot_id: booking.spot_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
        }
    }
}

/// A booking as the spot owner sees it, with the guest attached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestBooking {
    #[serde(flatten)]
    pub booking: Booking,
    #[serde(rename = "User")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SpotBooking {
    Guest(GuestBooking),
    Dates(BookedDates),
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpotBookings {
    #[serde(rename = "Bookings")]
    pub bookings: Vec<SpotBooking>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserBookings {
    #[serde(rename = "Bookings")]
    pub bookings: Vec<Booking>,
}
