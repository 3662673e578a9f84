//! Patrol session record and its transitions.
//!
//! A session moves `NotStarted -> InProgress -> Submitted`. "Not started" is
//! simply the absence of a [`PatrolSession`]; [`PatrolSession::begin`]
//! creates one in progress, and [`PatrolSession::finalize`] writes the
//! terminal status. Every mutation checks that the session is still in
//! progress, so a submitted record cannot be changed through these methods.
//!
//! Serialized field names follow the report format already stored by the
//! existing system (`pointId`, `signatureDataUrl`, `"Missed Points"`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::coverage::{coverage, Coverage};
use crate::directory::Checkpoint;
use crate::error::CoreError;
use crate::location::GeoPoint;
use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "Day",
            Shift::Night => "Night",
        }
    }
}

impl FromStr for Shift {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Day" => Ok(Shift::Day),
            "Night" => Ok(Shift::Night),
            other => Err(CoreError::Validation(format!("Unknown shift '{other}'"))),
        }
    }
}

/// Stored session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Missed Points")]
    MissedPoints,
}

impl PatrolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatrolStatus::InProgress => "In Progress",
            PatrolStatus::Completed => "Completed",
            PatrolStatus::MissedPoints => "Missed Points",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PatrolStatus::InProgress)
    }
}

impl fmt::Display for PatrolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatrolStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Progress" => Ok(PatrolStatus::InProgress),
            "Completed" => Ok(PatrolStatus::Completed),
            "Missed Points" => Ok(PatrolStatus::MissedPoints),
            other => Err(CoreError::Validation(format!(
                "Unknown patrol status '{other}'"
            ))),
        }
    }
}

/// State machine position derived from the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Submitted,
}

impl SessionPhase {
    pub fn of(session: Option<&PatrolSession>) -> Self {
        match session {
            None => SessionPhase::NotStarted,
            Some(s) if s.status.is_terminal() => SessionPhase::Submitted,
            Some(_) => SessionPhase::InProgress,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Proof of presence at one checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: String,
    #[serde(rename = "pointId")]
    pub checkpoint_id: EntityId,
    #[serde(rename = "pointName")]
    pub checkpoint_name: String,
    pub timestamp: Timestamp,
    pub location: GeoPoint,
}

impl ScanRecord {
    pub fn new(checkpoint: &Checkpoint, location: GeoPoint, timestamp: Timestamp) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            checkpoint_id: checkpoint.id().to_string(),
            checkpoint_name: checkpoint.name().to_string(),
            timestamp,
            location,
        }
    }
}

/// Input for starting a session. Every text field must be non-blank.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSession {
    #[validate(custom(function = "not_blank", message = "officerName is required"))]
    pub officer_name: String,
    #[validate(custom(function = "not_blank", message = "companyId is required"))]
    pub company_id: EntityId,
    #[validate(custom(function = "not_blank", message = "siteId is required"))]
    pub site_id: EntityId,
    #[validate(custom(function = "not_blank", message = "areaId is required"))]
    pub area_id: EntityId,
    pub shift: Shift,
}

impl StartSession {
    /// Check the input without creating anything.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        Ok(())
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// One officer's inspection round over one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolSession {
    pub id: EntityId,
    pub officer_name: String,
    pub company_id: EntityId,
    pub site_id: EntityId,
    pub area_id: EntityId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub shift: Shift,
    pub status: PatrolStatus,
    pub scans: Vec<ScanRecord>,
    #[serde(rename = "signatureDataUrl")]
    pub signature: Option<String>,
}

impl PatrolSession {
    /// Create an in-progress session with no scans.
    ///
    /// Fails with [`CoreError::Validation`] if any input field is blank.
    pub fn begin(
        id: impl Into<EntityId>,
        input: &StartSession,
        start_time: Timestamp,
    ) -> Result<Self, CoreError> {
        input.check()?;
        Ok(Self {
            id: id.into(),
            officer_name: input.officer_name.trim().to_string(),
            company_id: input.company_id.clone(),
            site_id: input.site_id.clone(),
            area_id: input.area_id.clone(),
            start_time,
            end_time: None,
            shift: input.shift,
            status: PatrolStatus::InProgress,
            scans: Vec::new(),
            signature: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        SessionPhase::of(Some(self))
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == PatrolStatus::InProgress
    }

    pub fn has_scanned(&self, checkpoint_id: &str) -> bool {
        self.scans.iter().any(|s| s.checkpoint_id == checkpoint_id)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Append an accepted scan.
    ///
    /// Rejects a second record for the same checkpoint, which keeps the
    /// one-record-per-checkpoint invariant even if a caller skipped the
    /// validator.
    pub fn append_scan(&mut self, record: ScanRecord) -> Result<(), CoreError> {
        self.ensure_in_progress()?;
        if self.has_scanned(&record.checkpoint_id) {
            return Err(CoreError::Conflict(format!(
                "Checkpoint {} already scanned in session {}",
                record.checkpoint_id, self.id
            )));
        }
        self.scans.push(record);
        Ok(())
    }

    /// Overwrite the signature. An empty blob clears it.
    pub fn set_signature(&mut self, blob: &str) -> Result<(), CoreError> {
        self.ensure_in_progress()?;
        self.signature = if blob.is_empty() {
            None
        } else {
            Some(blob.to_string())
        };
        Ok(())
    }

    /// Close the session: compute coverage, write the terminal status and
    /// the end time.
    pub fn finalize(
        &mut self,
        total_checkpoints: usize,
        end_time: Timestamp,
    ) -> Result<Coverage, CoreError> {
        self.ensure_in_progress()?;
        let result = coverage(self, total_checkpoints);
        self.status = result.status;
        self.end_time = Some(end_time);
        Ok(result)
    }

    fn ensure_in_progress(&self) -> Result<(), CoreError> {
        if self.is_in_progress() {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Session {} is already submitted ({})",
                self.id, self.status
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
