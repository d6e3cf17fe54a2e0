//! The access gateway: validates redemption attempts against a share
//! token's state and produces a permission-redacted credential view.
//!
//! Check order is a contract (each attempt is denied for the first
//! failing condition, and the order is deliberately not reorderable):
//! token exists, not revoked, not expired, hospital authorized,
//! credential available. Every attempt against an existing token
//! appends exactly one access-log entry, grant or deny.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::RedactedCredential;
use crate::error::{ShareError, ShareResult};
use crate::provider::CredentialStore;
use crate::share::{AccessLogEntry, AccessPermissions, ShareStore, ShareToken};

/// Default bound on credential store lookups.
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A granted redemption: the redacted credential plus share metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// The permission-redacted credential view.
    pub data: RedactedCredential,

    /// The permission mask the view was built with.
    pub permissions: AccessPermissions,

    /// Who created the share.
    pub shared_by: String,

    /// When the share was created.
    pub created_at: DateTime<Utc>,

    /// When the share expires.
    pub expires_at: DateTime<Utc>,
}

/// Validates share redemptions and serves redacted credential views.
#[derive(Clone, Debug)]
pub struct AccessGateway<C: CredentialStore, S: ShareStore> {
    credentials: C,
    shares: S,
    lookup_timeout: Duration,
}

impl<C: CredentialStore, S: ShareStore> AccessGateway<C, S> {
    /// Creates a gateway over a credential source and a share store.
    pub const fn new(credentials: C, shares: S) -> Self {
        Self {
            credentials,
            shares,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Overrides the bound applied to credential store lookups.
    #[must_use]
    pub const fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Redeems a share token on behalf of a hospital.
    ///
    /// # Errors
    ///
    /// A denial (`TokenNotFound`, `TokenRevoked`, `TokenExpired`,
    /// `HospitalNotAuthorized` or `CredentialUnavailable`) whose
    /// `Display` string is the logged reason, or `Unavailable` if the
    /// share store itself failed.
    pub async fn access(
        &self,
        token: &str,
        requesting_hospital: &str,
    ) -> ShareResult<AccessGrant> {
        let Some(share) = self.shares.get(token).await? else {
            // No token row exists to attach a log entry to.
            tracing::debug!("access denied: unknown token");
            return Err(ShareError::TokenNotFound);
        };

        if let Err(reason) = Self::check_redeemable(&share, requesting_hospital) {
            return self.deny(token, requesting_hospital, reason).await;
        }

        let credential = match tokio::time::timeout(
            self.lookup_timeout,
            self.credentials.credential(&share.credential_ref.transaction_hash),
        )
        .await
        {
            Ok(Ok(Some(credential))) => credential,
            Ok(Ok(None)) => {
                return self
                    .deny(token, requesting_hospital, ShareError::CredentialUnavailable)
                    .await;
            }
            Ok(Err(e)) => {
                tracing::error!("credential lookup failed: {e}");
                return self
                    .deny(token, requesting_hospital, ShareError::CredentialUnavailable)
                    .await;
            }
            Err(_) => {
                tracing::error!("credential lookup timed out");
                return self
                    .deny(token, requesting_hospital, ShareError::CredentialUnavailable)
                    .await;
            }
        };

        // Commit re-checks revocation under the store's write lock so a
        // revoke acknowledged during the lookup wins; the store records
        // the denial in that case.
        self.shares
            .commit_grant(token, AccessLogEntry::granted(requesting_hospital))
            .await?;

        tracing::debug!("access granted to {requesting_hospital}");
        Ok(AccessGrant {
            data: RedactedCredential::new(&credential, &share.permissions),
            permissions: share.permissions,
            shared_by: share.shared_by,
            created_at: share.created_at,
            expires_at: share.expires_at,
        })
    }

    /// Applies the ordered redemption checks to a token snapshot.
    fn check_redeemable(share: &ShareToken, requesting_hospital: &str) -> Result<(), ShareError> {
        if share.revoked {
            return Err(ShareError::TokenRevoked);
        }
        if share.is_expired_at(Utc::now()) {
            return Err(ShareError::TokenExpired);
        }
        if let Some(restricted) = &share.restricted_to_hospital {
            if !restricted.eq_ignore_ascii_case(requesting_hospital) {
                return Err(ShareError::HospitalNotAuthorized);
            }
        }
        Ok(())
    }

    /// Records a denial in the token's access log and returns it.
    async fn deny(
        &self,
        token: &str,
        requesting_hospital: &str,
        reason: ShareError,
    ) -> ShareResult<AccessGrant> {
        tracing::debug!("access denied for {requesting_hospital}: {reason}");
        self.shares
            .append_denial(
                token,
                AccessLogEntry::denied(requesting_hospital, reason.to_string()),
            )
            .await?;
        Err(reason)
    }
}
