use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use staybnb_db::RecordId;
use staybnb_http::{AppError, CurrentUser};

use super::models::{
    BookedDates, Booking, BookingRequest, GuestBooking, SpotBooking, SpotBookings, UserBookings,
};
use super::service::{create_booking, BookingStore};
use crate::{modules::users, store::Store};

/// Bookings of one spot. The owner sees guests; everyone else only dates.
pub async fn list_for_spot(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
) -> Result<Json<SpotBookings>, AppError> {
    let spot = store
        .spots
        .get(spot_id)
        .await
        .ok_or_else(|| AppError::not_found("Spot couldn't be found"))?;

    let bookings = store.bookings.bookings_for_spot(spot_id).await;

    let bookings = if spot.owner_id == current.id {
        let guests = users::summaries(&store, bookings.iter().map(|b| b.user_id)).await;
        bookings
            .into_iter()
            .map(|booking| {
                let user = guests.get(&booking.user_id).cloned();
                SpotBooking::Guest(GuestBooking { booking, user })
            })
            .collect()
    } else {
        bookings
            .iter()
            .map(|booking| SpotBooking::Dates(BookedDates::from(booking)))
            .collect()
    };

    Ok(Json(SpotBookings { bookings }))
}

pub async fn create_for_spot(
    State(store): State<Store>,
    Path(spot_id): Path<RecordId>,
    current: CurrentUser,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let guest = users::require_registered(&store, current).await?;

    // Keep the spot read-locked until the booking commits: a concurrent
    // delete then either runs first (404) or cascades over the new booking.
    let spots = store.spots.read().await;

    let booking = create_booking(
        &store.bookings,
        spot_id,
        spots.get(spot_id),
        guest.id,
        request.start_date,
        request.end_date,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn current(
    State(store): State<Store>,
    current: CurrentUser,
) -> Json<UserBookings> {
    let bookings = store.bookings.bookings_for_user(current.id).await;
    Json(UserBookings { bookings })
}
