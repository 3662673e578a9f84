//! Coverage calculation.

use std::collections::HashSet;

use serde::Serialize;

use crate::session::{PatrolSession, PatrolStatus};

/// Progress of a session over its area's checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub unique_scanned: usize,
    pub total: usize,
    pub percent: f64,
    pub status: PatrolStatus,
}

impl Coverage {
    /// Checkpoints not yet scanned.
    pub fn missed(&self) -> usize {
        self.total.saturating_sub(self.unique_scanned)
    }
}

/// Compute coverage of `session` over an area with `total_checkpoints`.
///
/// Distinct checkpoint ids are recounted here rather than trusting the
/// session's dedup. The status is `Completed` once every checkpoint has
/// been scanned, `MissedPoints` otherwise; an empty area counts as complete
/// with 0%.
pub fn coverage(session: &PatrolSession, total_checkpoints: usize) -> Coverage {
    let unique_scanned = session
        .scans
        .iter()
        .map(|s| s.checkpoint_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let percent = if total_checkpoints == 0 {
        0.0
    } else {
        (100.0 * unique_scanned as f64 / total_checkpoints as f64).min(100.0)
    };

    let status = if unique_scanned >= total_checkpoints {
        PatrolStatus::Completed
    } else {
        PatrolStatus::MissedPoints
    };

    Coverage {
        unique_scanned,
        total: total_checkpoints,
        percent,
        status,
    }
}
