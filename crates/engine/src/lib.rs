//! Patrol session execution engine.
//!
//! Drives one session at a time per [`ActivePatrol`]: validates scans,
//! waits for a location fix before committing each one, autosaves
//! progress in the background and writes the final record on submission.
//! Collaborators (directory, session store, location provider) are the
//! traits defined in `patrol_core`.

pub mod autosave;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod memory;
pub mod patrol;

pub use config::EngineConfig;
pub use error::{EngineError, ScanError};
pub use patrol::{ActivePatrol, PatrolEngine};
