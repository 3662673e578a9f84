//! Scan payload codec.
//!
//! Checkpoint labels encode a small JSON object. The wire shape is shared
//! with labels already printed in the field, so field names and key order
//! must not change:
//!
//! ```text
//! {"type":"patrol-point","pointId":"..","companyIdentifier":"..","siteIdentifier":"..","areaIdentifier":".."}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directory::Checkpoint;
use crate::identifiers::{resolve, OrgNode};
use crate::validation::RejectionReason;

/// Value of the `type` discriminator on every checkpoint label.
pub const PAYLOAD_TYPE: &str = "patrol-point";

/// Decoded contents of a checkpoint label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "pointId")]
    pub checkpoint_id: String,
    #[serde(rename = "companyIdentifier")]
    pub company_identifier: String,
    #[serde(rename = "siteIdentifier")]
    pub site_identifier: String,
    #[serde(rename = "areaIdentifier")]
    pub area_identifier: String,
}

impl ScanPayload {
    /// Build the label payload for a checkpoint in its organizational context.
    ///
    /// Context identifiers go through the resolver; the checkpoint itself is
    /// always referenced by its internal key.
    pub fn for_checkpoint(
        company: &OrgNode,
        site: &OrgNode,
        area: &OrgNode,
        checkpoint: &Checkpoint,
    ) -> Self {
        Self {
            kind: PAYLOAD_TYPE.to_string(),
            checkpoint_id: checkpoint.id().to_string(),
            company_identifier: resolve(company).to_string(),
            site_identifier: resolve(site).to_string(),
            area_identifier: resolve(area).to_string(),
        }
    }

    /// Parse untrusted decoded text.
    ///
    /// Text that is not JSON is [`RejectionReason::MalformedPayload`]. JSON
    /// that is not an object, has the wrong `type`, or lacks any of the four
    /// fields as a non-empty string is [`RejectionReason::UnrecognizedPayload`].
    pub fn parse(raw: &str) -> Result<Self, RejectionReason> {
        let value: Value =
            serde_json::from_str(raw).map_err(|_| RejectionReason::MalformedPayload)?;

        let object = value
            .as_object()
            .ok_or(RejectionReason::UnrecognizedPayload)?;

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .ok_or(RejectionReason::UnrecognizedPayload)
        };

        if text("type")? != PAYLOAD_TYPE {
            return Err(RejectionReason::UnrecognizedPayload);
        }

        Ok(Self {
            kind: PAYLOAD_TYPE.to_string(),
            checkpoint_id: text("pointId")?,
            company_identifier: text("companyIdentifier")?,
            site_identifier: text("siteIdentifier")?,
            area_identifier: text("areaIdentifier")?,
        })
    }

    /// The exact string to encode on a label.
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScanPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
