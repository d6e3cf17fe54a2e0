//! Durable keyed storage for share tokens.
//!
//! The store is the single mutation point for token state: inserts
//! reject duplicate keys (never overwrite), revocation and the grant
//! commit are serialized through the same write path so a revoke and a
//! concurrent access always agree on an order.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::error::{ShareError, ShareResult};
use crate::share::{AccessLogEntry, ShareToken};

/// Storage provider for share tokens.
///
/// Implementations must serialize mutations per token: after `revoke`
/// returns, no subsequent `commit_grant` for that token may succeed.
pub trait ShareStore: Send + Sync {
    /// Persists a new token. Fails with [`ShareError::Unavailable`] on
    /// storage trouble; returns `Ok(false)` if the key already exists
    /// so the caller can regenerate rather than overwrite.
    fn insert(&self, token: ShareToken) -> impl Future<Output = ShareResult<bool>> + Send;

    /// Fetches a snapshot of a token.
    fn get(&self, token: &str) -> impl Future<Output = ShareResult<Option<ShareToken>>> + Send;

    /// Marks a token revoked. Idempotent: revoking an already-revoked
    /// token is a no-op success. `TokenNotFound` for unknown keys.
    fn revoke(&self, token: &str) -> impl Future<Output = ShareResult<()>> + Send;

    /// Appends a denial entry to a token's access log.
    fn append_denial(
        &self,
        token: &str,
        entry: AccessLogEntry,
    ) -> impl Future<Output = ShareResult<()>> + Send;

    /// Commits a granted access: re-checks revocation under the write
    /// lock, then appends the granted entry and bumps `last_accessed`.
    ///
    /// If a revoke won the race, a denial entry is recorded instead and
    /// `TokenRevoked` is returned, so a grant is never logged after a
    /// revoke has been acknowledged.
    fn commit_grant(
        &self,
        token: &str,
        entry: AccessLogEntry,
    ) -> impl Future<Output = ShareResult<()>> + Send;

    /// All tokens for a patient, newest first.
    fn list_for_patient(
        &self,
        patient_id: &str,
    ) -> impl Future<Output = ShareResult<Vec<ShareToken>>> + Send;
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<String, ShareToken>,
    by_patient: HashMap<String, Vec<String>>,
}

/// In-memory share store.
///
/// Cheap to clone; clones share the same underlying map, so a manager
/// and a gateway handed clones of one store observe the same state.
#[derive(Clone, Default)]
pub struct MemoryShareStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryShareStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ShareResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| ShareError::Unavailable("share store lock poisoned".into()))
    }

    fn write(&self) -> ShareResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| ShareError::Unavailable("share store lock poisoned".into()))
    }
}

impl ShareStore for MemoryShareStore {
    async fn insert(&self, token: ShareToken) -> ShareResult<bool> {
        let mut inner = self.write()?;
        if inner.tokens.contains_key(&token.token) {
            return Ok(false);
        }
        let key = token.token.clone();
        let patient_id = token.credential_ref.patient_id.clone();
        inner.tokens.insert(key.clone(), token);
        inner.by_patient.entry(patient_id).or_default().push(key);
        Ok(true)
    }

    async fn get(&self, token: &str) -> ShareResult<Option<ShareToken>> {
        Ok(self.read()?.tokens.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> ShareResult<()> {
        let mut inner = self.write()?;
        let share = inner.tokens.get_mut(token).ok_or(ShareError::TokenNotFound)?;
        if !share.revoked {
            share.revoked = true;
            share.revoked_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn append_denial(&self, token: &str, entry: AccessLogEntry) -> ShareResult<()> {
        let mut inner = self.write()?;
        let share = inner.tokens.get_mut(token).ok_or(ShareError::TokenNotFound)?;
        share.access_log.push(entry);
        Ok(())
    }

    async fn commit_grant(&self, token: &str, entry: AccessLogEntry) -> ShareResult<()> {
        let mut inner = self.write()?;
        let share = inner.tokens.get_mut(token).ok_or(ShareError::TokenNotFound)?;
        if share.revoked {
            // A revoke completed between the caller's snapshot and this
            // commit; record the attempt as denied.
            share.access_log.push(AccessLogEntry::denied(
                entry.hospital,
                ShareError::TokenRevoked.to_string(),
            ));
            return Err(ShareError::TokenRevoked);
        }
        share.last_accessed = Some(entry.timestamp);
        share.access_log.push(entry);
        Ok(())
    }

    async fn list_for_patient(&self, patient_id: &str) -> ShareResult<Vec<ShareToken>> {
        let inner = self.read()?;
        let mut shares: Vec<ShareToken> = inner
            .by_patient
            .get(patient_id)
            .map(|keys| keys.iter().filter_map(|k| inner.tokens.get(k)).cloned().collect())
            .unwrap_or_default();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shares)
    }
}
