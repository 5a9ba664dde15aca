use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use staybnb_http::{AppError, CurrentUser};
use validator::Validate;

use super::models::{RegisterUser, User};
use crate::store::Store;

pub async fn register(
    State(store): State<Store>,
    Json(input): Json<RegisterUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    input.validate()?;

    let email = input.email.trim().to_lowercase();
    let username = input.username.trim().to_string();

    let user = store
        .users
        .transaction(|tx| {
            if !tx.scan(|user| user.email == email).is_empty() {
                return Err(AppError::conflict(
                    vec![serde_json::json!({ "field": "email", "error": "User with that email already exists" })],
                    "User already exists",
                ));
            }
            if !tx.scan(|user| user.username == username).is_empty() {
                return Err(AppError::conflict(
                    vec![serde_json::json!({ "field": "username", "error": "User with that username already exists" })],
                    "User already exists",
                ));
            }

            let now = Utc::now();
            Ok(tx.insert(|id| User {
                id,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                username: username.clone(),
                email: email.clone(),
                created_at: now,
                updated_at: now,
            }))
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn current(
    State(store): State<Store>,
    current: CurrentUser,
) -> Result<Json<User>, AppError> {
    store
        .users
        .get(current.id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::not_found("User couldn't be found"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testutils::TestApp;

    #[tokio::test]
    async fn register_then_fetch_current() {
        let app = TestApp::new();

        let (status, body) = app
            .post(
                "/api/users",
                None,
                json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "username": "ada.l",
                    "email": "Ada@Example.com"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "ada@example.com");
        let id = body["id"].as_u64().unwrap();

        let (status, body) = app.get("/api/users/current", Some(id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ada.l");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let app = TestApp::new();
        app.register("ada.l", "ada@example.com").await;

        let (status, body) = app
            .post(
                "/api/users",
                None,
                json!({
                    "firstName": "Ada",
                    "lastName": "Byron",
                    "username": "ada.b",
                    "email": "ada@example.com"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["details"][0]["field"], "email");
    }

    #[tokio::test]
    async fn invalid_registration_lists_fields() {
        let app = TestApp::new();
        let (status, body) = app
            .post(
                "/api/users",
                None,
                json!({
                    "firstName": "",
                    "lastName": "Lovelace",
                    "username": "ada",
                    "email": "not-an-email"
                }),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"username"));
        assert!(fields
            .iter()
            .any(|f| f.replace('_', "").eq_ignore_ascii_case("firstname")));
    }

    #[tokio::test]
    async fn current_requires_identity() {
        let app = TestApp::new();
        let (status, _) = app.get("/api/users/current", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.get("/api/users/current", Some(404)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
