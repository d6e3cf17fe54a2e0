//! # Request handlers for VIC share endpoints.

use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vic_share::gateway::AccessGrant;
use vic_share::share::{AccessLogEntry, CreateShareRequest, ShareSummary};

use super::{AppJson, ShareFailure};
use crate::AppState;

/// Create share response.
#[derive(Clone, Debug, Serialize)]
pub struct CreateShareResponse {
    /// Always true; failures render through [`ShareFailure`].
    pub success: bool,

    /// The minted token.
    pub share_token: String,

    /// When the share expires.
    pub expires_at: DateTime<Utc>,

    /// Human-readable confirmation.
    pub message: String,
}

// Create a share token for a credential.
#[axum::debug_handler]
pub async fn create(
    State(state): State<AppState>, axum::Json(req): axum::Json<CreateShareRequest>,
) -> Result<AppJson<CreateShareResponse>, ShareFailure> {
    let created = state.manager.create(req).await?;
    Ok(AppJson(CreateShareResponse {
        success: true,
        share_token: created.share_token,
        expires_at: created.expires_at,
        message: "VIC share created successfully".into(),
    }))
}

/// Query string for share redemption.
#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    /// Name of the requesting hospital.
    #[serde(default)]
    pub hospital: Option<String>,
}

/// Access share response: the grant plus the standard envelope fields.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessShareResponse {
    /// Always true; denials render through [`ShareFailure`].
    pub success: bool,

    /// The redacted credential and share metadata.
    #[serde(flatten)]
    pub grant: AccessGrant,

    /// Human-readable confirmation.
    pub message: String,
}

// Redeem a share token on behalf of a hospital.
#[axum::debug_handler]
pub async fn access(
    State(state): State<AppState>, Path(token): Path<String>, Query(query): Query<AccessQuery>,
) -> Result<AppJson<AccessShareResponse>, ShareFailure> {
    let hospital = query.hospital.unwrap_or_else(|| "unknown".into());
    let grant = state.gateway.access(&token, &hospital).await?;
    Ok(AppJson(AccessShareResponse {
        success: true,
        grant,
        message: "Access granted".into(),
    }))
}

/// Revoke share response.
#[derive(Clone, Debug, Serialize)]
pub struct RevokeShareResponse {
    /// Always true; failures render through [`ShareFailure`].
    pub success: bool,

    /// Human-readable confirmation.
    pub message: String,
}

// Revoke a share token. Idempotent.
#[axum::debug_handler]
pub async fn revoke(
    State(state): State<AppState>, Path(token): Path<String>,
) -> Result<AppJson<RevokeShareResponse>, ShareFailure> {
    state.manager.revoke(&token).await?;
    Ok(AppJson(RevokeShareResponse {
        success: true,
        message: "VIC share revoked successfully".into(),
    }))
}

// List all shares for a patient, newest first.
#[axum::debug_handler]
pub async fn patient_shares(
    State(state): State<AppState>, Path(patient_id): Path<String>,
) -> Result<AppJson<Vec<ShareSummary>>, ShareFailure> {
    let shares = state.manager.shares_for_patient(&patient_id).await?;
    Ok(AppJson(shares))
}

// Return the ordered access log for a share token.
#[axum::debug_handler]
pub async fn access_logs(
    State(state): State<AppState>, Path(token): Path<String>,
) -> Result<AppJson<Vec<AccessLogEntry>>, ShareFailure> {
    let log = state.manager.access_log(&token).await?;
    Ok(AppJson(log))
}
