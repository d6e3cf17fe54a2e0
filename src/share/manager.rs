//! Share token lifecycle management: minting, revocation, listing and
//! audit retrieval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::{is_valid_transaction_hash, CredentialRef};
use crate::error::{ShareError, ShareResult};
use crate::share::{
    mint_token, AccessLogEntry, AccessPermissions, ShareStatus, ShareStore, ShareToken,
};

/// Inclusive bounds for `expires_in_hours`: one hour to one year.
pub const EXPIRY_HOURS_RANGE: (i64, i64) = (1, 8760);

/// Default share lifetime when the request does not specify one.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Attempts at minting a unique token before giving up. Collisions on
/// 256 bits of entropy mean the random source is broken, not bad luck.
const MINT_ATTEMPTS: usize = 4;

/// Request to create a share token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// Transaction hash of the credential being shared.
    pub transaction_hash: String,

    /// Patient the credential belongs to.
    pub patient_id: String,

    /// Actor label recorded against the share.
    #[serde(default = "default_shared_by")]
    pub shared_by: String,

    /// Restrict redemption to this hospital, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_hospital: Option<String>,

    /// Share lifetime in hours, 1 to 8760.
    #[serde(default = "default_expiry_hours")]
    pub expires_in_hours: i64,

    /// Field-level permission mask.
    #[serde(default)]
    pub access_permissions: AccessPermissions,
}

fn default_shared_by() -> String {
    "Patient".into()
}

const fn default_expiry_hours() -> i64 {
    DEFAULT_EXPIRY_HOURS
}

/// A successfully created share.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedShare {
    /// The minted token string.
    pub share_token: String,

    /// When the share stops granting access.
    pub expires_at: DateTime<Utc>,
}

/// Summary of one share, as listed for a patient.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSummary {
    /// The token string.
    pub share_token: String,

    /// Transaction hash of the shared credential.
    pub transaction_hash: String,

    /// Who created the share.
    pub shared_by: String,

    /// Hospital restriction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with_hospital: Option<String>,

    /// Permission mask snapshotted at creation.
    pub permissions: AccessPermissions,

    /// Status as of the listing.
    pub status: ShareStatus,

    /// When the share was created.
    pub created_at: DateTime<Utc>,

    /// When the share expires.
    pub expires_at: DateTime<Utc>,

    /// Last granted access, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl From<&ShareToken> for ShareSummary {
    fn from(share: &ShareToken) -> Self {
        Self {
            share_token: share.token.clone(),
            transaction_hash: share.credential_ref.transaction_hash.clone(),
            shared_by: share.shared_by.clone(),
            shared_with_hospital: share.restricted_to_hospital.clone(),
            permissions: share.permissions,
            status: share.status(),
            created_at: share.created_at,
            expires_at: share.expires_at,
            last_accessed: share.last_accessed,
        }
    }
}

/// Mints and manages the lifecycle of share tokens.
#[derive(Clone, Debug)]
pub struct ShareTokenManager<S: ShareStore> {
    store: S,
}

impl<S: ShareStore> ShareTokenManager<S> {
    /// Creates a manager over a share store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Validates a create request and mints a share token.
    ///
    /// Nothing is persisted on any validation failure. Token generation
    /// is retried on a (theoretical) key collision rather than
    /// overwriting an existing share.
    ///
    /// # Errors
    ///
    /// `Validation` for an ill-formed transaction hash, empty patient
    /// id, out-of-range expiry or an all-false permission mask;
    /// `Unavailable` if the store cannot persist the token.
    pub async fn create(&self, request: CreateShareRequest) -> ShareResult<CreatedShare> {
        if request.transaction_hash.is_empty() || request.patient_id.is_empty() {
            return Err(ShareError::Validation(
                "transaction_hash and patient_id are required".into(),
            ));
        }
        if !is_valid_transaction_hash(&request.transaction_hash) {
            return Err(ShareError::Validation(
                "transaction_hash must be 0x-prefixed hex of at least 10 characters".into(),
            ));
        }
        let (min, max) = EXPIRY_HOURS_RANGE;
        if request.expires_in_hours < min || request.expires_in_hours > max {
            return Err(ShareError::Validation(format!(
                "expires_in_hours must be between {min} and {max}"
            )));
        }
        if !request.access_permissions.allows_any() {
            return Err(ShareError::Validation(
                "at least one access permission must be granted".into(),
            ));
        }

        let now = Utc::now();
        let expires_at = now + Duration::hours(request.expires_in_hours);

        for _ in 0..MINT_ATTEMPTS {
            let share = ShareToken {
                token: mint_token(),
                credential_ref: CredentialRef {
                    transaction_hash: request.transaction_hash.clone(),
                    patient_id: request.patient_id.clone(),
                },
                shared_by: request.shared_by.clone(),
                restricted_to_hospital: request.shared_with_hospital.clone(),
                permissions: request.access_permissions,
                created_at: now,
                expires_at,
                revoked: false,
                revoked_at: None,
                last_accessed: None,
                access_log: Vec::new(),
            };
            let token = share.token.clone();
            if self.store.insert(share).await? {
                tracing::debug!("created share {token} for patient {}", request.patient_id);
                return Ok(CreatedShare {
                    share_token: token,
                    expires_at,
                });
            }
            tracing::warn!("share token collision, regenerating");
        }
        Err(ShareError::Unavailable(
            "could not mint a unique share token".into(),
        ))
    }

    /// Revokes a share token. Irreversible; revoking an already-revoked
    /// token is an idempotent success.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` for an unknown token; `Unavailable` on store
    /// trouble.
    pub async fn revoke(&self, token: &str) -> ShareResult<()> {
        self.store.revoke(token).await?;
        tracing::debug!("revoked share {token}");
        Ok(())
    }

    /// Lists all shares for a patient, newest first.
    ///
    /// # Errors
    ///
    /// `Unavailable` on store trouble.
    pub async fn shares_for_patient(&self, patient_id: &str) -> ShareResult<Vec<ShareSummary>> {
        let shares = self.store.list_for_patient(patient_id).await?;
        Ok(shares.iter().map(ShareSummary::from).collect())
    }

    /// Returns the ordered access log for a token.
    ///
    /// # Errors
    ///
    /// `TokenNotFound` for an unknown token; `Unavailable` on store
    /// trouble.
    pub async fn access_log(&self, token: &str) -> ShareResult<Vec<AccessLogEntry>> {
        let share = self.store.get(token).await?.ok_or(ShareError::TokenNotFound)?;
        Ok(share.access_log)
    }
}
