//! Request handlers.
//!
//! Handlers drive the patrol engine and map its errors via
//! [`AppError`](crate::error::AppError).

pub mod checkpoints;
pub mod patrols;
