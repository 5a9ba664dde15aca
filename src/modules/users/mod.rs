pub mod models;
mod routes;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Map};
use staybnb_db::RecordId;
use staybnb_http::{AppError, CurrentUser};
use staybnb_kernel::{InitCtx, Module};

use crate::{
    store::Store,
    utils::{collect_schemas, error_response, json_content},
};
use models::{RegisterUser, User, UserSummary};

pub struct UsersModule {
    store: Store,
}

impl UsersModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            identity_header = %ctx.settings.auth.user_header,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(routes::register))
            .route("/current", get(routes::current))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut schemas = Map::new();
        collect_schemas::<User>(&mut schemas);
        collect_schemas::<UserSummary>(&mut schemas);
        collect_schemas::<RegisterUser>(&mut schemas);

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Users"],
                        "requestBody": { "required": true, "content": json_content("RegisterUser") },
                        "responses": {
                            "201": { "description": "User created", "content": json_content("User") },
                            "409": error_response("Email or username already taken"),
                            "422": error_response("Validation error")
                        }
                    }
                },
                "/current": {
                    "get": {
                        "summary": "Get the authenticated user",
                        "tags": ["Users"],
                        "security": [{ "userHeader": [] }],
                        "responses": {
                            "200": { "description": "Current user", "content": json_content("User") },
                            "401": error_response("Authentication required"),
                            "404": error_response("User not registered")
                        }
                    }
                }
            },
            "components": { "schemas": schemas }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let users = self.store.users.len().await;
        tracing::info!(
            module = self.name(),
            users = users,
            "users module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Resolve the caller to a registered user; unknown identities are rejected.
pub async fn require_registered(store: &Store, current: CurrentUser) -> Result<User, AppError> {
    store
        .users
        .get(current.id)
        .await
        .ok_or_else(|| AppError::unauthorized("User is not registered"))
}

/// Public summaries for a set of user ids, keyed by id.
pub async fn summaries(
    store: &Store,
    ids: impl IntoIterator<Item = RecordId>,
) -> HashMap<RecordId, UserSummary> {
    let wanted: std::collections::HashSet<RecordId> = ids.into_iter().collect();
    store
        .users
        .scan(|user| wanted.contains(&user.id))
        .await
        .iter()
        .map(|user| (user.id, UserSummary::from(user)))
        .collect()
}

pub fn create_module(store: Store) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(UsersModule::new(store))
}
