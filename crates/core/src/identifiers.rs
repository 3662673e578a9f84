//! Organizational nodes and the external-facing identifier resolver.
//!
//! Companies, sites, areas and checkpoints all share the same identity
//! shape: an internal key plus an optional operator-assigned custom
//! identifier. Printed checkpoint labels carry the *external* identifier,
//! so scans are cross-checked against [`resolve`], never against `id`
//! directly.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// A company, site, area or checkpoint as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub id: EntityId,
    pub name: String,
    pub custom_id: Option<String>,
}

impl OrgNode {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            custom_id: None,
        }
    }

    /// Attach an operator-assigned identifier.
    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// The identifier that must appear on encoded payloads for this node.
    pub fn external_id(&self) -> &str {
        resolve(self)
    }
}

/// Resolve the external-facing identifier of a node.
///
/// Returns the trimmed custom identifier when it is set and non-blank,
/// otherwise the internal key. Total over every node.
pub fn resolve(node: &OrgNode) -> &str {
    match node.custom_id.as_deref().map(str::trim) {
        Some(custom) if !custom.is_empty() => custom,
        _ => &node.id,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
