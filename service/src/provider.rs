//! # Storage providers for the service.
//!
//! The service runs entirely on the SDK's in-memory stores. Clones of
//! each store share state, so the manager and the gateway handed out
//! from here observe the same tokens.

use vic_share::gateway::AccessGateway;
use vic_share::provider::MemoryCredentialStore;
use vic_share::share::{MemoryShareStore, ShareTokenManager};

/// The service's provider set.
#[derive(Clone)]
pub struct Provider {
    /// Issued credentials (written by the issuance stub, read by the
    /// gateway).
    pub credentials: MemoryCredentialStore,

    /// Share token state.
    pub shares: MemoryShareStore,
}

impl Provider {
    /// Creates fresh, empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credentials: MemoryCredentialStore::new(),
            shares: MemoryShareStore::new(),
        }
    }

    /// A manager over the shared token store.
    #[must_use]
    pub fn manager(&self) -> ShareTokenManager<MemoryShareStore> {
        ShareTokenManager::new(self.shares.clone())
    }

    /// A gateway over the shared stores.
    #[must_use]
    pub fn gateway(&self) -> AccessGateway<MemoryCredentialStore, MemoryShareStore> {
        AccessGateway::new(self.credentials.clone(), self.shares.clone())
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}
