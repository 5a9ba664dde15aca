//! Resolution of the authenticated caller.
//!
//! Authentication happens upstream; the gateway forwards the user id in a
//! header whose name comes from [`AuthSettings`]. The router installs the
//! settings as a request extension (see `RouterBuilder::with_auth`).

use axum::{extract::FromRequestParts, http::request::Parts};
use staybnb_db::RecordId;
use staybnb_kernel::settings::AuthSettings;

use crate::error::AppError;

/// The authenticated user issuing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: RecordId,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_name = parts
            .extensions
            .get::<AuthSettings>()
            .map(|auth| auth.user_header.clone())
            .unwrap_or_else(|| AuthSettings::default().user_header);

        let raw = parts
            .headers
            .get(header_name.as_str())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let id = raw
            .to_str()
            .ok()
            .and_then(|value| value.parse::<RecordId>().ok())
            .ok_or_else(|| AppError::unauthorized("Malformed user identity"))?;

        Ok(CurrentUser { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(request: Request<()>) -> Result<CurrentUser, AppError> {
        let (mut parts, _) = request.into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_default_header() {
        let request = Request::builder().header("x-user-id", "12").body(()).unwrap();
        let user = extract(request).await.unwrap();
        assert_eq!(user.id, RecordId::new(12));
    }

    #[tokio::test]
    async fn honours_configured_header() {
        let mut request = Request::builder().header("x-staff-id", "3").body(()).unwrap();
        request.extensions_mut().insert(AuthSettings {
            user_header: "x-staff-id".to_string(),
        });
        assert_eq!(extract(request).await.unwrap().id, RecordId::new(3));
    }

    #[tokio::test]
    async fn rejects_missing_and_malformed_identity() {
        let missing = extract(Request::builder().body(()).unwrap()).await.unwrap_err();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder().header("x-user-id", "alice").body(()).unwrap();
        let malformed = extract(request).await.unwrap_err();
        assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);
    }
}
