//! Scanned-payload dispatch.
//!
//! QR and manual-input payloads carry an explicit `type` field; the
//! enum decodes with a single dispatch on that tag instead of probing
//! for the presence of individual keys. Unknown tags are a decode
//! error, not a fallback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::Credential;

/// A payload scanned or pasted into a client, discriminated by its
/// `type` tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanPayload {
    /// A full credential, as embedded in an issuance QR code.
    #[serde(rename = "VIC")]
    Credential(Credential),

    /// A share token artifact. Schema must match the distributing
    /// client exactly: `{type, shareToken, hospital, expiresAt}`.
    #[serde(rename = "VIC_SHARE", rename_all = "camelCase")]
    Share {
        /// The share token to redeem.
        share_token: String,
        /// Hospital the share was prepared for.
        hospital: String,
        /// When the share expires.
        expires_at: DateTime<Utc>,
    },

    /// A patient-identity payload (legacy import format).
    #[serde(rename = "PatientData", rename_all = "camelCase")]
    Patient {
        /// Patient decentralized identifier.
        did: String,
        /// Patient display name.
        name: String,
    },
}

impl ScanPayload {
    /// Builds the share artifact distributed out-of-band after a share
    /// is created.
    #[must_use]
    pub fn share(share_token: impl Into<String>, hospital: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self::Share {
            share_token: share_token.into(),
            hospital: hospital.into(),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn share_payload_schema_is_stable() {
        let expires_at = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).single().expect("valid time");
        let payload = ScanPayload::share("VIC_abc", "General Hospital", expires_at);
        let json = serde_json::to_value(&payload).expect("should serialize");

        assert_eq!(json["type"], "VIC_SHARE");
        assert_eq!(json["shareToken"], "VIC_abc");
        assert_eq!(json["hospital"], "General Hospital");
        assert_eq!(json["expiresAt"], "2026-09-01T12:00:00Z");
    }

    #[test]
    fn dispatch_is_by_tag_only() {
        let round_trip: ScanPayload = serde_json::from_str(
            r#"{"type":"VIC_SHARE","shareToken":"VIC_abc","hospital":"H1","expiresAt":"2026-09-01T12:00:00Z"}"#,
        )
        .expect("should deserialize");
        assert!(matches!(round_trip, ScanPayload::Share { .. }));

        // A payload without a recognized tag is an error, even if its
        // fields look like a share.
        let unknown = serde_json::from_str::<ScanPayload>(
            r#"{"type":"MYSTERY","shareToken":"VIC_abc","hospital":"H1"}"#,
        );
        assert!(unknown.is_err());

        let untagged = serde_json::from_str::<ScanPayload>(
            r#"{"shareToken":"VIC_abc","hospital":"H1"}"#,
        );
        assert!(untagged.is_err());
    }

    #[test]
    fn patient_payload_parses() {
        let payload: ScanPayload = serde_json::from_str(
            r#"{"type":"PatientData","did":"did:example:123","name":"Jane Doe"}"#,
        )
        .expect("should deserialize");
        assert_eq!(
            payload,
            ScanPayload::Patient {
                did: "did:example:123".into(),
                name: "Jane Doe".into()
            }
        );
    }
}
