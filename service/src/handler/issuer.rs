//! # Request handlers for the hospital-side issuance stub.
//!
//! A minimal stand-in for the issuance backend so the share flow can be
//! exercised end to end: issue a credential, verify it by transaction
//! hash, report service health.

use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vic_share::credential::Credential;

use super::{AppError, AppJson};
use crate::AppState;

/// Issue credential request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IssueVicRequest {
    /// Issuing hospital.
    pub hospital: String,

    /// Patient the credential is for.
    pub patient_id: String,

    /// The medical record being credentialed.
    pub medical_data: MedicalData,
}

/// The medical fields of an issuance request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MedicalData {
    /// Patient display name.
    pub patient_name: String,

    /// Diagnosis.
    pub diagnosis: String,

    /// Treatment.
    pub treatment: String,

    /// Attending doctor.
    pub doctor: String,

    /// Date of the medical event.
    pub date: String,

    /// Free-text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Issue credential response.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueVicResponse {
    /// Whether issuance succeeded.
    pub success: bool,

    /// Transaction hash anchoring the new credential.
    pub transaction_hash: String,

    /// Block the issuance was recorded in.
    pub block_number: u64,

    /// Patient the credential was issued to.
    pub patient_id: String,
}

// Issue a credential into the issuance store.
#[axum::debug_handler]
pub async fn issue(
    State(state): State<AppState>, axum::Json(req): axum::Json<IssueVicRequest>,
) -> Result<AppJson<IssueVicResponse>, AppError> {
    let timestamp = Utc::now();

    // Hash the canonical request plus the timestamp so identical
    // requests still mint distinct credentials.
    let canonical = serde_json::to_vec(&req).map_err(anyhow::Error::from)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hasher.update(timestamp.timestamp_nanos_opt().unwrap_or_default().to_be_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    let transaction_hash = format!("0x{}", &hex[..40]);

    let block_number = state.credentials.len().map(|n| n as u64 + 1)?;
    let credential = Credential {
        transaction_hash: transaction_hash.clone(),
        block_number,
        hospital: req.hospital,
        patient_id: req.patient_id.clone(),
        patient_name: req.medical_data.patient_name,
        diagnosis: req.medical_data.diagnosis,
        treatment: req.medical_data.treatment,
        doctor: req.medical_data.doctor,
        date: req.medical_data.date,
        notes: req.medical_data.notes,
        timestamp,
        verification_url: format!("{}/verify/{transaction_hash}", state.external_address),
        demo_mode: false,
    };
    state.credentials.issue(credential)?;
    tracing::debug!("issued credential {transaction_hash} in block {block_number}");

    Ok(AppJson(IssueVicResponse {
        success: true,
        transaction_hash,
        block_number,
        patient_id: req.patient_id,
    }))
}

/// Verification response.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyResponse {
    /// Whether the credential exists.
    pub verified: bool,

    /// Human-readable outcome.
    pub message: String,

    /// The credential, when verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Credential>,
}

// Verify a credential by transaction hash.
#[axum::debug_handler]
pub async fn verify(
    State(state): State<AppState>, Path(transaction_hash): Path<String>,
) -> Result<AppJson<VerifyResponse>, AppError> {
    use vic_share::provider::CredentialStore as _;

    let found = state.credentials.credential(&transaction_hash).await?;
    let response = found.map_or_else(
        || VerifyResponse {
            verified: false,
            message: "VIC not found in blockchain".into(),
            data: None,
        },
        |credential| VerifyResponse {
            verified: true,
            message: "VIC verified successfully".into(),
            data: Some(credential),
        },
    );
    Ok(AppJson(response))
}
