//! The VIC (Verifiable Identity Credential) data model.
//!
//! A VIC is an immutable medical record credential anchored to a
//! blockchain transaction reference. It is created once at issuance by
//! a hospital system and is never mutated by the sharing subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::share::AccessPermissions;

/// Minimum length of a transaction hash, including the `0x` prefix.
const MIN_HASH_LEN: usize = 10;

/// A hospital-issued medical credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Unique transaction hash anchoring the credential
    /// (`0x`-prefixed hex, at least 10 characters).
    pub transaction_hash: String,

    /// Block the issuance transaction was recorded in.
    pub block_number: u64,

    /// Issuing hospital.
    pub hospital: String,

    /// Identifier of the patient the credential is about.
    pub patient_id: String,

    /// Patient display name.
    pub patient_name: String,

    /// Diagnosis recorded at issuance.
    pub diagnosis: String,

    /// Treatment recorded at issuance.
    pub treatment: String,

    /// Attending doctor.
    pub doctor: String,

    /// Date of the medical event.
    pub date: String,

    /// Free-text notes, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Issuance timestamp (UTC).
    pub timestamp: DateTime<Utc>,

    /// URL a third party can use to verify the credential.
    pub verification_url: String,

    /// Whether the credential was issued by a demo backend.
    pub demo_mode: bool,
}

impl Credential {
    /// Borrow the credential's reference key.
    #[must_use]
    pub fn reference(&self) -> CredentialRef {
        CredentialRef {
            transaction_hash: self.transaction_hash.clone(),
            patient_id: self.patient_id.clone(),
        }
    }
}

/// Reference to a credential: the transaction hash plus the patient it
/// belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRef {
    /// Transaction hash of the referenced credential.
    pub transaction_hash: String,

    /// Patient the referenced credential belongs to.
    pub patient_id: String,
}

/// Checks that a transaction hash is well-formed: non-empty, prefixed
/// `0x`, hex digits only and at least 10 characters in total.
#[must_use]
pub fn is_valid_transaction_hash(hash: &str) -> bool {
    let Some(digits) = hash.strip_prefix("0x") else {
        return false;
    };
    hash.len() >= MIN_HASH_LEN && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// A credential view with fields omitted per a share token's permission
/// mask.
///
/// Non-sensitive fields are always present. Each permissioned field is
/// absent (not blank) when the corresponding flag is false.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedCredential {
    /// Transaction hash (always disclosed).
    pub transaction_hash: String,

    /// Block number (always disclosed).
    pub block_number: u64,

    /// Issuing hospital (always disclosed).
    pub hospital: String,

    /// Patient identifier (always disclosed).
    pub patient_id: String,

    /// Patient name (always disclosed).
    pub patient_name: String,

    /// Issuance timestamp (always disclosed).
    pub timestamp: DateTime<Utc>,

    /// Diagnosis, when permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    /// Treatment, when permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,

    /// Doctor, when permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,

    /// Date, when permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Notes, when permitted and present on the credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RedactedCredential {
    /// Builds a redacted view of a credential from a permission mask.
    #[must_use]
    pub fn new(credential: &Credential, permissions: &AccessPermissions) -> Self {
        Self {
            transaction_hash: credential.transaction_hash.clone(),
            block_number: credential.block_number,
            hospital: credential.hospital.clone(),
            patient_id: credential.patient_id.clone(),
            patient_name: credential.patient_name.clone(),
            timestamp: credential.timestamp,
            diagnosis: permissions.diagnosis.then(|| credential.diagnosis.clone()),
            treatment: permissions.treatment.then(|| credential.treatment.clone()),
            doctor: permissions.doctor.then(|| credential.doctor.clone()),
            date: permissions.date.then(|| credential.date.clone()),
            notes: if permissions.notes {
                credential.notes.clone()
            } else {
                None
            },
        }
    }
}
