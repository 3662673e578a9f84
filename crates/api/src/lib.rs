//! Patrol API server library.
//!
//! Exposes config, state, error handling, the session registry and routes
//! so integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
