//! Field-level permission masks for share tokens.

use serde::{Deserialize, Serialize};

/// Which credential fields a share token discloses.
///
/// The mask is snapshotted onto the token at creation and never mutated
/// afterwards. Defaults disclose everything except `notes`, matching
/// what a patient typically consents to share.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPermissions {
    /// Disclose the diagnosis.
    #[serde(default = "default_true")]
    pub diagnosis: bool,

    /// Disclose the treatment.
    #[serde(default = "default_true")]
    pub treatment: bool,

    /// Disclose the attending doctor.
    #[serde(default = "default_true")]
    pub doctor: bool,

    /// Disclose the date of the medical event.
    #[serde(default = "default_true")]
    pub date: bool,

    /// Disclose free-text notes.
    #[serde(default)]
    pub notes: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for AccessPermissions {
    fn default() -> Self {
        Self {
            diagnosis: true,
            treatment: true,
            doctor: true,
            date: true,
            notes: false,
        }
    }
}

impl AccessPermissions {
    /// Whether at least one field is disclosed. A mask that discloses
    /// nothing is rejected at creation time.
    #[must_use]
    pub const fn allows_any(&self) -> bool {
        self.diagnosis || self.treatment || self.doctor || self.date || self.notes
    }
}
