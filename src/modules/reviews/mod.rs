pub mod models;
mod routes;

use async_trait::async_trait;
use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Map, Value};
use staybnb_kernel::{InitCtx, Module};

use crate::{
    store::Store,
    utils::{collect_schemas, error_response, json_content},
};
use models::{NewReviewImage, Review, ReviewImageView, ReviewInput, ReviewList};

pub struct ReviewsModule {
    store: Store,
}

impl ReviewsModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

fn review_id_param() -> Value {
    json!({
        "name": "review_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/current", get(routes::current))
            .route("/{review_id}", put(routes::edit).delete(routes::remove))
            .route("/{review_id}/images", post(routes::add_image))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let mut schemas = Map::new();
        collect_schemas::<Review>(&mut schemas);
        collect_schemas::<ReviewInput>(&mut schemas);
        collect_schemas::<ReviewList>(&mut schemas);
        collect_schemas::<NewReviewImage>(&mut schemas);
        collect_schemas::<ReviewImageView>(&mut schemas);

        Some(json!({
            "paths": {
                "/current": {
                    "get": {
                        "summary": "Reviews written by the authenticated user",
                        "tags": ["Reviews"],
                        "security": [{ "userHeader": [] }],
                        "responses": {
                            "200": { "description": "Reviews", "content": json_content("ReviewList") },
                            "401": error_response("Authentication required")
                        }
                    }
                },
                "/{review_id}": {
                    "parameters": [review_id_param()],
                    "put": {
                        "summary": "Edit a review",
                        "tags": ["Reviews"],
                        "security": [{ "userHeader": [] }],
                        "requestBody": { "required": true, "content": json_content("ReviewInput") },
                        "responses": {
                            "200": { "description": "Review updated", "content": json_content("Review") },
                            "403": error_response("Not the author"),
                            "404": error_response("Review couldn't be found"),
                            "422": error_response("Validation error")
                        }
                    },
                    "delete": {
                        "summary": "Delete a review",
                        "tags": ["Reviews"],
                        "security": [{ "userHeader": [] }],
                        "responses": {
                            "200": { "description": "Deleted" },
                            "403": error_response("Not the author"),
                            "404": error_response("Review couldn't be found")
                        }
                    }
                },
                "/{review_id}/images": {
                    "parameters": [review_id_param()],
                    "post": {
                        "summary": "Attach an image to a review",
                        "tags": ["Reviews"],
                        "security": [{ "userHeader": [] }],
                        "requestBody": { "required": true, "content": json_content("NewReviewImage") },
                        "responses": {
                            "201": { "description": "Image added", "content": json_content("ReviewImageView") },
                            "403": error_response("Not the author"),
                            "404": error_response("Review couldn't be found"),
                            "422": error_response("Validation error")
                        }
                    }
                }
            },
            "components": { "schemas": schemas }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let reviews = self.store.reviews.len().await;
        tracing::info!(
            module = self.name(),
            reviews = reviews,
            "reviews module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

/// Routes nested under a spot, merged into the spots router.
pub fn spot_routes() -> Router<Store> {
    Router::new().route(
        "/{spot_id}/reviews",
        get(routes::list_for_spot).post(routes::create_for_spot),
    )
}

/// OpenAPI paths for [`spot_routes`], relative to the spots mount point.
pub fn spot_paths() -> Value {
    json!({
        "/{spot_id}/reviews": {
            "get": {
                "summary": "Reviews of a spot",
                "tags": ["Reviews"],
                "responses": {
                    "200": { "description": "Reviews", "content": json_content("ReviewList") },
                    "404": error_response("Spot couldn't be found")
                }
            },
            "post": {
                "summary": "Review a spot",
                "tags": ["Reviews"],
                "security": [{ "userHeader": [] }],
                "requestBody": { "required": true, "content": json_content("ReviewInput") },
                "responses": {
                    "201": { "description": "Review created", "content": json_content("Review") },
                    "401": error_response("Authentication required"),
                    "404": error_response("Spot couldn't be found"),
                    "409": error_response("User already has a review for this spot"),
                    "422": error_response("Validation error")
                }
            }
        }
    })
}

pub fn create_module(store: Store) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new(store))
}
