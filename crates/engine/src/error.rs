use patrol_core::error::CoreError;
use patrol_core::location::LocationError;
use patrol_core::store::StoreError;
use patrol_core::types::EntityId;
use patrol_core::validation::RejectionReason;

/// Failure of a session-level operation (start, resume, signature, submit).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Session {0} is no longer in progress")]
    SessionClosed(EntityId),
}

/// Why a scan attempt produced no record.
///
/// Whatever the variant, the session is unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Validation rejected the label (including the informational repeat).
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// The location fix failed; the scan is aborted.
    #[error("Could not get location. Scan aborted: {0}")]
    Location(#[from] LocationError),

    /// The caller cancelled while waiting for a location fix.
    #[error("Scan cancelled")]
    Cancelled,

    #[error("Session {0} is no longer in progress")]
    SessionClosed(EntityId),

    #[error(transparent)]
    Core(#[from] CoreError),
}
