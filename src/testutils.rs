use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use staybnb_kernel::settings::Settings;
use tower::ServiceExt;

use crate::{build_registry, store::Store};

/// The full application router over a fresh in-memory store.
pub struct TestApp {
    pub store: Store,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Store::new();
        let registry = build_registry(&store);
        let router = staybnb_http::build_router(&registry, &Settings::default());
        Self { store, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<u64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user.to_string());
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: Option<u64>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, user, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<u64>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, user, Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: Option<u64>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, user, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Option<u64>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, user, None).await
    }

    /// Register a user and return its id.
    pub async fn register(&self, username: &str, email: &str) -> u64 {
        let (status, body) = self
            .post(
                "/api/users",
                None,
                json!({
                    "firstName": "Test",
                    "lastName": username,
                    "username": username,
                    "email": email
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_u64().unwrap()
    }

    /// Create a spot owned by `owner` and return its id.
    pub async fn create_spot(&self, owner: u64, name: &str, price: f64) -> u64 {
        let (status, body) = self.post("/api/spots", Some(owner), spot_body(name, price)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_u64().unwrap()
    }
}

pub fn spot_body(name: &str, price: f64) -> Value {
    json!({
        "address": "123 Disney Lane",
        "city": "San Francisco",
        "state": "California",
        "country": "United States of America",
        "lat": 37.7645358,
        "lng": -122.4730327,
        "name": name,
        "description": "Place where web developers are created",
        "price": price
    })
}
