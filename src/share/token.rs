//! Share tokens: time-bound, permission-scoped, revocable access to a
//! single credential.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::credential::CredentialRef;
use crate::share::AccessPermissions;

/// Entropy used for a minted token, before encoding.
const TOKEN_BYTES: usize = 32;

/// Prefix carried by every minted token so scanned artifacts are
/// recognizable without decoding.
pub const TOKEN_PREFIX: &str = "VIC_";

/// Mints a new opaque share token: `VIC_` followed by 32 random bytes,
/// base64url-encoded without padding.
///
/// Uniqueness is not guaranteed here; the store rejects duplicate keys
/// and the manager retries generation on conflict.
#[must_use]
pub fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    format!("{TOKEN_PREFIX}{}", Base64UrlUnpadded::encode_string(&bytes))
}

/// Lifecycle status of a share token.
///
/// `Expired` is derived by comparing `expires_at` with the clock at
/// read time; it is never stored as a transition and there is no
/// background expiry sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    /// The token can grant access.
    Active,
    /// The token was explicitly revoked. Terminal.
    Revoked,
    /// The token's expiry has passed.
    Expired,
}

/// One access attempt against a share token, granted or denied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// When the attempt was made.
    pub timestamp: DateTime<Utc>,

    /// The hospital that presented the token.
    pub hospital: String,

    /// Whether access was granted.
    pub granted: bool,

    /// Denial reason; absent on granted attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AccessLogEntry {
    /// Records a granted attempt.
    #[must_use]
    pub fn granted(hospital: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            hospital: hospital.into(),
            granted: true,
            reason: None,
        }
    }

    /// Records a denied attempt with its reason.
    #[must_use]
    pub fn denied(hospital: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            hospital: hospital.into(),
            granted: false,
            reason: Some(reason.into()),
        }
    }
}

/// A share token and its full state.
///
/// Created by the share token manager, mutated only through the share
/// store (revocation and log appends), never deleted by this subsystem.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareToken {
    /// The opaque token string (store key).
    pub token: String,

    /// The credential this token grants access to.
    pub credential_ref: CredentialRef,

    /// Who created the share. Free text, defaults to `"Patient"`.
    pub shared_by: String,

    /// Restricts redemption to one hospital (case-insensitive exact
    /// match) when set.
    pub restricted_to_hospital: Option<String>,

    /// Permission mask snapshotted at creation. Immutable.
    pub permissions: AccessPermissions,

    /// When the token was created.
    pub created_at: DateTime<Utc>,

    /// When the token stops granting access.
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked.
    pub revoked: bool,

    /// When the token was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,

    /// Last time access was granted through this token.
    pub last_accessed: Option<DateTime<Utc>>,

    /// Append-only audit trail of every redemption attempt.
    pub access_log: Vec<AccessLogEntry>,
}

impl ShareToken {
    /// Whether the token's expiry has passed as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The token's status as of `now`. Revocation wins over expiry.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> ShareStatus {
        if self.revoked {
            ShareStatus::Revoked
        } else if self.is_expired_at(now) {
            ShareStatus::Expired
        } else {
            ShareStatus::Active
        }
    }

    /// The token's status as of the current clock.
    #[must_use]
    pub fn status(&self) -> ShareStatus {
        self.status_at(Utc::now())
    }
}
