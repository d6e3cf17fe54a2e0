//! # VIC Share
//!
//! An SDK for the share lifecycle of VICs (Verifiable Identity
//! Credentials): hospital-issued medical record credentials anchored to
//! a blockchain transaction reference. A patient mints a time-limited,
//! permission-scoped, revocable *share token* for one credential; a
//! hospital redeems the token and receives a view of the credential
//! with fields omitted per the token's permission mask, with every
//! attempt recorded in an append-only access log.
//!
//! The crate does not provide a user or service interface - that is the
//! job of an application implementer. See the `service` crate in this
//! workspace for an HTTP service built on the SDK.
//!
//! # Design
//!
//! ** Lifecycle **
//!
//! [`share::ShareTokenManager`] mints and manages tokens: validated
//! creation, idempotent irreversible revocation, per-patient listing
//! and audit retrieval. [`gateway::AccessGateway`] redeems tokens: an
//! ordered chain of checks (exists, not revoked, not expired, hospital
//! authorized, credential available) where the first failure is the
//! denial reason, followed by redaction of the underlying credential.
//! Expiry is derived at read time by comparing `expires_at` with the
//! clock; there is no stored Expired transition and no sweep job.
//!
//! ** Provider **
//!
//! Implementors supply storage through 'Provider' traits:
//! [`share::ShareStore`] for token state (the store is the single
//! mutation point, which is what makes a racing revoke and access
//! agree on an order) and [`provider::CredentialStore`] for read-only
//! credential lookups. In-memory implementations of both ship with the
//! crate.

pub mod credential;
pub mod error;
pub mod gateway;
pub mod payload;
pub mod provider;
pub mod share;

pub use error::{ShareError, ShareResult};
