//! Spot bookings and the date-conflict rule guarding them.

pub mod conflict;
pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::{json, Map, Value};
use staybnb_kernel::{InitCtx, Module};

use crate::{
    store::Store,
    utils::{collect_schemas, error_response, json_content},
};
use models::{BookedDates, Booking, BookingRequest, GuestBooking, SpotBookings, UserBookings};

pub struct BookingsModule {
    store: Store,
}

impl BookingsModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "bookings module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/current", get(routes::current))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut schemas = Map::new();
        collect_schemas::<Booking>(&mut schemas);
        collect_schemas::<BookingRequest>(&mut schemas);
        collect_schemas::<BookedDates>(&mut schemas);
        collect_schemas::<GuestBooking>(&mut schemas);
        collect_schemas::<SpotBookings>(&mut schemas);
        collect_schemas::<UserBookings>(&mut schemas);

        Some(json!({
            "paths": {
                "/current": {
                    "get": {
                        "summary": "Bookings made by the authenticated user",
                        "tags": ["Bookings"],
                        "security": [{ "userHeader": [] }],
                        "responses": {
                            "200": { "description": "Bookings", "content": json_content("UserBookings") },
                            "401": error_response("Authentication required")
                        }
                    }
                }
            },
            "components": { "schemas": schemas }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let bookings = self.store.bookings.len().await;
        tracing::info!(
            module = self.name(),
            bookings = bookings,
            "bookings module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module stopped");
        Ok(())
    }
}

/// Routes nested under a spot, merged into the spots router.
pub fn spot_routes() -> Router<Store> {
    Router::new().route(
        "/{spot_id}/bookings",
        get(routes::list_for_spot).post(routes::create_for_spot),
    )
}

/// OpenAPI paths for [`spot_routes`], relative to the spots mount point.
pub fn spot_paths() -> Value {
    json!({
        "/{spot_id}/bookings": {
            "get": {
                "summary": "Bookings of a spot",
                "description": "The owner sees every booking with its guest; anyone else sees booked dates only.",
                "tags": ["Bookings"],
                "security": [{ "userHeader": [] }],
                "responses": {
                    "200": { "description": "Bookings", "content": json_content("SpotBookings") },
                    "401": error_response("Authentication required"),
                    "404": error_response("Spot couldn't be found")
                }
            },
            "post": {
                "summary": "Book a spot",
                "description": "Date ranges are inclusive; a request overlapping any existing booking of the spot is rejected.",
                "tags": ["Bookings"],
                "security": [{ "userHeader": [] }],
                "requestBody": { "required": true, "content": json_content("BookingRequest") },
                "responses": {
                    "201": { "description": "Booking created", "content": json_content("Booking") },
                    "401": error_response("Authentication required"),
                    "403": error_response("Owners cannot book their own spot"),
                    "404": error_response("Spot couldn't be found"),
                    "409": error_response("Dates conflict with an existing booking"),
                    "422": error_response("endDate is before startDate")
                }
            }
        }
    })
}

pub fn create_module(store: Store) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BookingsModule::new(store))
}
