//! Scan validation.
//!
//! Decides whether a decoded label may be recorded in a session. Checks run
//! in a fixed order so the officer gets the most specific feedback first:
//! payload shape, company, site, area, checkpoint membership, then repeat.

use serde::Serialize;

use crate::directory::{Checkpoint, DirectorySnapshot};
use crate::identifiers::resolve;
use crate::payload::ScanPayload;
use crate::session::PatrolSession;

/// Why a scan was not recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("Not a valid patrol QR code.")]
    MalformedPayload,

    #[error("Invalid or unrecognized QR code.")]
    UnrecognizedPayload,

    #[error("This point belongs to a different company.")]
    WrongCompany,

    #[error("This point belongs to a different site.")]
    WrongSite,

    #[error("This point belongs to a different area.")]
    WrongArea,

    #[error("Scanned point not found in the current patrol area.")]
    CheckpointNotFound,

    /// Informational: the checkpoint is already covered.
    #[error("{checkpoint_name} has already been scanned.")]
    AlreadyScanned { checkpoint_name: String },
}

impl RejectionReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MalformedPayload => "MALFORMED_PAYLOAD",
            RejectionReason::UnrecognizedPayload => "UNRECOGNIZED_PAYLOAD",
            RejectionReason::WrongCompany => "WRONG_COMPANY",
            RejectionReason::WrongSite => "WRONG_SITE",
            RejectionReason::WrongArea => "WRONG_AREA",
            RejectionReason::CheckpointNotFound => "CHECKPOINT_NOT_FOUND",
            RejectionReason::AlreadyScanned { .. } => "ALREADY_SCANNED",
        }
    }

    /// A notice rather than an input error.
    pub fn is_informational(&self) -> bool {
        matches!(self, RejectionReason::AlreadyScanned { .. })
    }
}

/// Validate decoded label text against a session and its directory snapshot.
///
/// Returns the matching checkpoint on acceptance. Reads only; never mutates.
pub fn validate<'a>(
    raw: &str,
    session: &PatrolSession,
    snapshot: &'a DirectorySnapshot,
) -> Result<&'a Checkpoint, RejectionReason> {
    let payload = ScanPayload::parse(raw)?;

    if payload.company_identifier != resolve(&snapshot.company) {
        return Err(RejectionReason::WrongCompany);
    }
    if payload.site_identifier != resolve(&snapshot.site) {
        return Err(RejectionReason::WrongSite);
    }
    if payload.area_identifier != resolve(&snapshot.area) {
        return Err(RejectionReason::WrongArea);
    }

    let checkpoint = snapshot
        .checkpoint(&payload.checkpoint_id)
        .ok_or(RejectionReason::CheckpointNotFound)?;

    if session.has_scanned(checkpoint.id()) {
        return Err(RejectionReason::AlreadyScanned {
            checkpoint_name: checkpoint.name().to_string(),
        });
    }

    Ok(checkpoint)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
