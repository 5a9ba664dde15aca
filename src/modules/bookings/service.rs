use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use staybnb_authz::{ensure_not_owner, AuthzError};
use staybnb_db::{RecordId, Table};
use staybnb_http::AppError;
use thiserror::Error;

use super::conflict::{check_conflict, conflicting_fields, ConflictResult, DateConflict, DateRange};
use super::models::Booking;
use crate::modules::spots::models::Spot;

const CONFLICT_MESSAGE: &str = "Sorry, this spot is already booked for the specified dates";

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("spot {0} couldn't be found")]
    NotFound(RecordId),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("requested dates conflict with {} existing booking(s)", .0.len())]
    Conflict(Vec<DateConflict>),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(_) => AppError::not_found("Spot couldn't be found"),
            BookingError::Forbidden(err) => AppError::from(err),
            BookingError::Conflict(conflicts) => {
                let details = conflicts
                    .iter()
                    .flat_map(|conflict| {
                        conflict.fields.iter().map(move |field| {
                            json!({
                                "field": field.as_str(),
                                "error": field.message(),
                                "bookingId": conflict.booking_id,
                            })
                        })
                    })
                    .collect();
                AppError::conflict_with_code("booking_conflict", details, CONFLICT_MESSAGE)
            }
            BookingError::InvalidRange { .. } => {
                AppError::invalid_field("endDate", "endDate cannot be before startDate")
            }
        }
    }
}

/// Persistence seam for bookings.
///
/// `insert_unless_conflicting` must run the read, the conflict check and the
/// write as one atomic step with respect to other bookings of the same spot.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn bookings_for_spot(&self, spot_id: RecordId) -> Vec<Booking>;

    async fn bookings_for_user(&self, user_id: RecordId) -> Vec<Booking>;

    async fn insert_unless_conflicting(
        &self,
        spot_id: RecordId,
        user_id: RecordId,
        range: DateRange,
    ) -> Result<Booking, BookingError>;
}

#[async_trait]
impl BookingStore for Table<Booking> {
    async fn bookings_for_spot(&self, spot_id: RecordId) -> Vec<Booking> {
        self.scan(|booking| booking.spot_id == spot_id).await
    }

    async fn bookings_for_user(&self, user_id: RecordId) -> Vec<Booking> {
        self.scan(|booking| booking.user_id == user_id).await
    }

    async fn insert_unless_conflicting(
        &self,
        spot_id: RecordId,
        user_id: RecordId,
        range: DateRange,
    ) -> Result<Booking, BookingError> {
        self.transaction(|tx| {
            let existing = tx.scan(|booking| booking.spot_id == spot_id);

            match check_conflict(spot_id, range, existing.iter().copied()) {
                ConflictResult::NoConflict => {
                    let now = Utc::now();
                    Ok(tx.insert(|id| Booking {
                        id,
                        spot_id,
                        user_id,
                        start_date: range.start,
                        end_date: range.end,
                        created_at: now,
                        updated_at: now,
                    }))
                }
                ConflictResult::Conflict {
                    conflicting_booking_ids,
                } => {
                    let conflicts = existing
                        .iter()
                        .filter(|booking| conflicting_booking_ids.contains(&booking.id))
                        .map(|booking| conflicting_fields(range, booking))
                        .collect();
                    Err(BookingError::Conflict(conflicts))
                }
            }
        })
        .await
    }
}

/// Book `spot` for `user_id` from `start_date` through `end_date` inclusive.
///
/// `spot` is the caller's lookup of the requested spot; `None` means it does
/// not exist. On success the store holds exactly one new booking; on any
/// error it is unchanged.
pub async fn create_booking<S>(
    store: &S,
    spot_id: RecordId,
    spot: Option<&Spot>,
    user_id: RecordId,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Booking, BookingError>
where
    S: BookingStore + ?Sized,
{
    let spot = spot.ok_or(BookingError::NotFound(spot_id))?;
    ensure_not_owner("book a spot", &spot.owner_id, &user_id)?;

    let range = DateRange::new(start_date, end_date).ok_or(BookingError::InvalidRange {
        start: start_date,
        end: end_date,
    })?;

    match store.insert_unless_conflicting(spot.id, user_id, range).await {
        Ok(booking) => {
            tracing::info!(
                booking_id = %booking.id,
                spot_id = %booking.spot_id,
                user_id = %booking.user_id,
                start_date = %booking.start_date,
                end_date = %booking.end_date,
                "booking created"
            );
            Ok(booking)
        }
        Err(err) => {
            tracing::info!(spot_id = %spot.id, user_id = %user_id, error = %err, "booking rejected");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::bookings::conflict::DateField;
    use axum::http::StatusCode;
    use std::sync::Arc;

    const OWNER: RecordId = RecordId::new(1);
    const GUEST: RecordId = RecordId::new(2);

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn spot() -> Spot {
        let now = Utc::now();
        Spot {
            id: RecordId::new(10),
            owner_id: OWNER,
            address: "123 Disney Lane".to_string(),
            city: "San Francisco".to_string(),
            state: "California".to_string(),
            country: "United States of America".to_string(),
            lat: 37.76,
            lng: -122.47,
            name: "App Academy".to_string(),
            description: "Place where web developers are created".to_string(),
            price: 123.0,
            created_at: now,
            updated_at: now,
        }
    }

    async fn book(
        store: &Table<Booking>,
        user: RecordId,
        start: &str,
        end: &str,
    ) -> Result<Booking, BookingError> {
        let spot = spot();
        create_booking(store, spot.id, Some(&spot), user, date(start), date(end)).await
    }

    #[tokio::test]
    async fn creates_booking_when_dates_are_free() {
        let store = Table::new("bookings");
        let booking = book(&store, GUEST, "2024-07-01", "2024-07-05").await.unwrap();

        assert_eq!(booking.spot_id, RecordId::new(10));
        assert_eq!(booking.user_id, GUEST);
        assert_eq!(store.bookings_for_spot(booking.spot_id).await, vec![booking.clone()]);
        assert_eq!(store.bookings_for_user(GUEST).await, vec![booking]);
    }

    #[tokio::test]
    async fn overlapping_request_is_rejected_without_writing() {
        let store = Table::new("bookings");
        let first = book(&store, GUEST, "2024-07-01", "2024-07-05").await.unwrap();

        let err = book(&store, RecordId::new(3), "2024-07-03", "2024-07-10")
            .await
            .unwrap_err();
        match err {
            BookingError::Conflict(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].booking_id, first.id);
                assert_eq!(conflicts[0].fields, vec![DateField::StartDate]);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_spot_is_not_found() {
        let store = Table::new("bookings");
        let err = create_booking(
            &store,
            RecordId::new(404),
            None,
            GUEST,
            date("2024-07-01"),
            date("2024-07-02"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(id) if id == RecordId::new(404)));
    }

    #[tokio::test]
    async fn owner_cannot_book_own_spot() {
        let store = Table::new("bookings");
        let err = book(&store, OWNER, "2024-07-01", "2024-07-02").await.unwrap_err();
        assert!(matches!(err, BookingError::Forbidden(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn inverted_range_is_invalid() {
        let store = Table::new("bookings");
        let err = book(&store, GUEST, "2024-07-05", "2024-07-01").await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidRange { .. }));
        assert_eq!(AppError::from(err).status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn single_day_bookings_are_allowed() {
        let store = Table::new("bookings");
        book(&store, GUEST, "2024-07-01", "2024-07-01").await.unwrap();
        book(&store, GUEST, "2024-07-02", "2024-07-02").await.unwrap();
        let err = book(&store, GUEST, "2024-07-02", "2024-07-02").await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict(_)));
    }

    #[tokio::test]
    async fn conflict_maps_to_field_details() {
        let store = Table::new("bookings");
        book(&store, GUEST, "2024-07-05", "2024-07-10").await.unwrap();

        let err = book(&store, GUEST, "2024-07-01", "2024-07-20").await.unwrap_err();
        match AppError::from(err) {
            AppError::Conflict { details, code, .. } => {
                assert_eq!(code, "booking_conflict");
                assert_eq!(details.len(), 2);
                assert_eq!(details[0]["field"], "startDate");
                assert_eq!(details[1]["field"], "endDate");
                assert_eq!(details[1]["bookingId"], 1);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overlapping_requests_admit_exactly_one() {
        for _ in 0..25 {
            let store = Arc::new(Table::<Booking>::new("bookings"));

            let attempts: Vec<_> = [
                ("2024-07-01", "2024-07-05"),
                ("2024-07-05", "2024-07-09"),
                ("2024-07-04", "2024-07-06"),
            ]
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| {
                let store = store.clone();
                tokio::spawn(async move {
                    book(&store, RecordId::new(100 + i as u64), start, end).await
                })
            })
            .collect();

            let mut successes = 0;
            let mut conflicts = 0;
            for attempt in attempts {
                match attempt.await.unwrap() {
                    Ok(_) => successes += 1,
                    Err(BookingError::Conflict(_)) => conflicts += 1,
                    Err(other) => panic!("unexpected error {other:?}"),
                }
            }

            assert_eq!(successes, 1);
            assert_eq!(conflicts, 2);
            assert_eq!(store.len().await, 1);
        }
    }
}
