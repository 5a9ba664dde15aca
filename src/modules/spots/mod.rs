//! Spot listings, images and the routes nested under a spot.

pub mod models;
pub mod query;
pub mod rating;
mod routes;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Map, Value};
use staybnb_kernel::{InitCtx, Module};

use crate::{
    modules::{bookings, reviews},
    store::Store,
    utils::{collect_schemas, error_response, json_content},
};
use models::{NewSpotImage, Spot, SpotDetail, SpotImageView, SpotInput, SpotsList, SpotsPage};

pub struct SpotsModule {
    store: Store,
}

impl SpotsModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn query_param(name: &str, description: &str, schema: Value) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": schema
    })
}

fn spot_id_param() -> Value {
    json!({
        "name": "spot_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

#[async_trait]
impl Module for SpotsModule {
    fn name(&self) -> &'static str {
        "spots"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "spots module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list).post(routes::create))
            .route("/current", get(routes::list_current))
            .route(
                "/{spot_id}",
                get(routes::detail).put(routes::edit).delete(routes::remove),
            )
            .route("/{spot_id}/images", post(routes::add_image))
            .merge(bookings::spot_routes())
            .merge(reviews::spot_routes())
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut schemas = Map::new();
        collect_schemas::<Spot>(&mut schemas);
        collect_schemas::<SpotInput>(&mut schemas);
        collect_schemas::<SpotsPage>(&mut schemas);
        collect_schemas::<SpotsList>(&mut schemas);
        collect_schemas::<SpotDetail>(&mut schemas);
        collect_schemas::<NewSpotImage>(&mut schemas);
        collect_schemas::<SpotImageView>(&mut schemas);

        let number = json!({ "type": "number" });
        let mut paths = json!({
            "/": {
                "get": {
                    "summary": "List spots",
                    "tags": ["Spots"],
                    "parameters": [
                        query_param("page", "1 to 10, default 1", json!({ "type": "integer", "minimum": 1, "maximum": 10 })),
                        query_param("size", "1 to 20, default 20", json!({ "type": "integer", "minimum": 1, "maximum": 20 })),
                        query_param("minLat", "Minimum latitude", number.clone()),
                        query_param("maxLat", "Maximum latitude", number.clone()),
                        query_param("minLng", "Minimum longitude", number.clone()),
                        query_param("maxLng", "Maximum longitude", number.clone()),
                        query_param("minPrice", "Minimum price", number.clone()),
                        query_param("maxPrice", "Maximum price", number)
                    ],
                    "responses": {
                        "200": { "description": "A page of spots", "content": json_content("SpotsPage") },
                        "422": error_response("Invalid query parameters")
                    }
                },
                "post": {
                    "summary": "Create a spot",
                    "tags": ["Spots"],
                    "security": [{ "userHeader": [] }],
                    "requestBody": { "required": true, "content": json_content("SpotInput") },
                    "responses": {
                        "201": { "description": "Spot created", "content": json_content("Spot") },
                        "401": error_response("Authentication required"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/current": {
                "get": {
                    "summary": "Spots owned by the authenticated user",
                    "tags": ["Spots"],
                    "security": [{ "userHeader": [] }],
                    "responses": {
                        "200": { "description": "Spots", "content": json_content("SpotsList") },
                        "401": error_response("Authentication required")
                    }
                }
            },
            "/{spot_id}": {
                "parameters": [spot_id_param()],
                "get": {
                    "summary": "Spot detail",
                    "tags": ["Spots"],
                    "responses": {
                        "200": { "description": "Spot", "content": json_content("SpotDetail") },
                        "404": error_response("Spot couldn't be found")
                    }
                },
                "put": {
                    "summary": "Edit a spot",
                    "tags": ["Spots"],
                    "security": [{ "userHeader": [] }],
                    "requestBody": { "required": true, "content": json_content("SpotInput") },
                    "responses": {
                        "200": { "description": "Spot updated", "content": json_content("Spot") },
                        "403": error_response("Not the owner"),
                        "404": error_response("Spot couldn't be found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": "Delete a spot with its images, reviews and bookings",
                    "tags": ["Spots"],
                    "security": [{ "userHeader": [] }],
                    "responses": {
                        "200": { "description": "Deleted" },
                        "403": error_response("Not the owner"),
                        "404": error_response("Spot couldn't be found")
                    }
                }
            },
            "/{spot_id}/images": {
                "parameters": [spot_id_param()],
                "post": {
                    "summary": "Add an image to a spot",
                    "tags": ["Spots"],
                    "security": [{ "userHeader": [] }],
                    "requestBody": { "required": true, "content": json_content("NewSpotImage") },
                    "responses": {
                        "201": { "description": "Image added", "content": json_content("SpotImageView") },
                        "403": error_response("Not the owner"),
                        "404": error_response("Spot couldn't be found"),
                        "422": error_response("Validation error")
                    }
                }
            }
        });

        if let Some(paths) = paths.as_object_mut() {
            for nested in [bookings::spot_paths(), reviews::spot_paths()] {
                if let Value::Object(nested) = nested {
                    paths.extend(nested);
                }
            }
        }

        Some(json!({
            "paths": paths,
            "components": { "schemas": schemas }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let spots = self.store.spots.len().await;
        tracing::info!(
            module = self.name(),
            spots = spots,
            "spots module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "spots module stopped");
        Ok(())
    }
}

pub fn create_module(store: Store) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(SpotsModule::new(store))
}
