//! Domain logic for patrol sessions.
//!
//! This crate has no internal dependencies and no I/O. It holds the
//! identifier resolver, the scan payload codec and validator, the session
//! record with its transitions, coverage calculation, and the collaborator
//! traits that the engine, the database layer and the HTTP layer plug into.

pub mod coverage;
pub mod directory;
pub mod error;
pub mod identifiers;
pub mod location;
pub mod payload;
pub mod session;
pub mod store;
pub mod types;
pub mod validation;
