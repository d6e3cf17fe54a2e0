//! # Request handler plumbing shared by all endpoints.

pub mod issuer;
pub mod share;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use vic_share::ShareError;

use crate::AppState;

/// JSON response wrapper.
pub struct AppJson<T>(pub T);

impl<T> IntoResponse for AppJson<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// Top-level application error for unexpected failures. Logged in
/// full; the caller sees a generic message.
pub struct AppError(anyhow::Error);

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("internal error: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "internal error" })),
        )
            .into_response()
    }
}

/// A share operation failure, rendered as the standard envelope.
///
/// Business denials keep their (deliberately generic) reason text;
/// infrastructure trouble is logged in full but surfaced as a bland
/// retryable message so store internals never reach the wire.
pub struct ShareFailure(pub ShareError);

impl From<ShareError> for ShareFailure {
    fn from(e: ShareError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ShareFailure {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ShareError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            ShareError::TokenNotFound => (StatusCode::NOT_FOUND, self.0.to_string()),
            ShareError::TokenRevoked
            | ShareError::TokenExpired
            | ShareError::HospitalNotAuthorized => (StatusCode::FORBIDDEN, self.0.to_string()),
            ShareError::CredentialUnavailable => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            ShareError::Unavailable(detail) => {
                tracing::error!("share store unavailable: {detail}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service temporarily unavailable".to_string(),
                )
            }
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

// Service banner for the root route.
#[axum::debug_handler]
pub async fn index() -> AppJson<serde_json::Value> {
    AppJson(json!({ "message": "VIC Share API Server", "status": "running" }))
}

/// Service health: issuance volume and liveness.
#[axum::debug_handler]
pub async fn health(
    State(state): State<AppState>,
) -> Result<AppJson<serde_json::Value>, AppError> {
    let vic_issuances = state.credentials.len()?;
    Ok(AppJson(json!({ "status": "healthy", "vic_issuances": vic_issuances })))
}
