//! Row types for the patrol tables.
//!
//! Each model derives `FromRow` and converts into the matching
//! `patrol_core` domain type.

pub mod area;
pub mod checkpoint;
pub mod company;
pub mod patrol_session;
pub mod site;
