//! The share subsystem: permission masks, share tokens, the keyed
//! token store and the lifecycle manager.

mod manager;
mod permissions;
mod store;
mod token;

pub use manager::{
    CreateShareRequest, CreatedShare, ShareSummary, ShareTokenManager, DEFAULT_EXPIRY_HOURS,
    EXPIRY_HOURS_RANGE,
};
pub use permissions::AccessPermissions;
pub use store::{MemoryShareStore, ShareStore};
pub use token::{mint_token, AccessLogEntry, ShareStatus, ShareToken, TOKEN_PREFIX};
