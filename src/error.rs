//! Error types for the VIC share lifecycle.

use thiserror::Error;

/// Result type for share operations.
pub type ShareResult<T> = Result<T, ShareError>;

/// Errors that can occur while creating, revoking or redeeming a share
/// token.
///
/// The `Display` text of the denial variants is the exact reason string
/// recorded in the access log and returned over the wire, so boundaries
/// never have to invent (or risk leaking more detailed) messages.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Input failed validation before anything was persisted.
    #[error("{0}")]
    Validation(String),

    /// The share token does not exist.
    #[error("invalid token")]
    TokenNotFound,

    /// The share token has been revoked.
    #[error("token revoked")]
    TokenRevoked,

    /// The share token's expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// The token is restricted to a different hospital.
    #[error("hospital not authorized")]
    HospitalNotAuthorized,

    /// The referenced credential could not be fetched (missing, lookup
    /// failure or timeout).
    #[error("credential unavailable")]
    CredentialUnavailable,

    /// The token store is temporarily unavailable; callers may retry.
    #[error("share store unavailable: {0}")]
    Unavailable(String),
}

impl ShareError {
    /// Whether this error is a redemption denial (as opposed to bad
    /// input or infrastructure failure).
    #[must_use]
    pub const fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::TokenNotFound
                | Self::TokenRevoked
                | Self::TokenExpired
                | Self::HospitalNotAuthorized
                | Self::CredentialUnavailable
        )
    }
}
