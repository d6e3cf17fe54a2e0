//! Provider traits implemented by the hosting application.
//!
//! In the same style as the share store, the credential source is a
//! trait so the gateway can run against whatever backs the deployment:
//! the in-memory issuance store shipped here, or a client for the real
//! issuance backend.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use anyhow::anyhow;

use crate::credential::Credential;

/// Read-only source of issued credentials.
///
/// The sharing subsystem never writes through this trait; issuance is
/// the hospital backend's concern.
pub trait CredentialStore: Send + Sync {
    /// Fetches a credential by transaction hash. `Ok(None)` means the
    /// credential does not exist; `Err` means the lookup itself failed.
    fn credential(
        &self,
        transaction_hash: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Credential>>> + Send;
}

/// In-memory credential store, keyed by transaction hash.
///
/// Doubles as the issuance store for the hospital-side stub: the
/// service's issue endpoint inserts here and the gateway reads from it.
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<HashMap<String, Credential>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issued credential. Issuance is create-once: inserting
    /// an already-known transaction hash is rejected.
    ///
    /// # Errors
    ///
    /// Fails if the transaction hash is already present or the store
    /// lock is poisoned.
    pub fn issue(&self, credential: Credential) -> anyhow::Result<()> {
        let mut map =
            self.inner.write().map_err(|_| anyhow!("credential store lock poisoned"))?;
        if map.contains_key(&credential.transaction_hash) {
            return Err(anyhow!(
                "credential {} already issued",
                credential.transaction_hash
            ));
        }
        map.insert(credential.transaction_hash.clone(), credential);
        Ok(())
    }

    /// Number of credentials issued so far.
    ///
    /// # Errors
    ///
    /// Fails if the store lock is poisoned.
    pub fn len(&self) -> anyhow::Result<usize> {
        let map = self.inner.read().map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(map.len())
    }

    /// Whether no credentials have been issued.
    ///
    /// # Errors
    ///
    /// Fails if the store lock is poisoned.
    pub fn is_empty(&self) -> anyhow::Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn credential(&self, transaction_hash: &str) -> anyhow::Result<Option<Credential>> {
        let map = self.inner.read().map_err(|_| anyhow!("credential store lock poisoned"))?;
        Ok(map.get(transaction_hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_credential(hash: &str) -> Credential {
        Credential {
            transaction_hash: hash.into(),
            block_number: 1,
            hospital: "General Hospital".into(),
            patient_id: "P1".into(),
            patient_name: "Jane Doe".into(),
            diagnosis: "Hypertension".into(),
            treatment: "Lisinopril 10mg".into(),
            doctor: "Dr. Rahma".into(),
            date: "2025-11-02".into(),
            notes: None,
            timestamp: Utc::now(),
            verification_url: "https://chain.example/verify".into(),
            demo_mode: false,
        }
    }

    #[tokio::test]
    async fn issue_then_lookup() {
        let store = MemoryCredentialStore::new();
        store.issue(sample_credential("0xabc1234567")).expect("should issue");

        let found = store.credential("0xabc1234567").await.expect("should look up");
        assert_eq!(found.expect("exists").patient_id, "P1");

        let missing = store.credential("0xfff7654321").await.expect("should look up");
        assert!(missing.is_none());
    }

    #[test]
    fn issuance_is_create_once() {
        let store = MemoryCredentialStore::new();
        store.issue(sample_credential("0xabc1234567")).expect("should issue");
        assert!(store.issue(sample_credential("0xabc1234567")).is_err());
        assert_eq!(store.len().expect("should count"), 1);
    }
}
