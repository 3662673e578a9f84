//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod area_repo;
pub mod checkpoint_repo;
pub mod company_repo;
pub mod patrol_session_repo;
pub mod site_repo;

pub use area_repo::AreaRepo;
pub use checkpoint_repo::CheckpointRepo;
pub use company_repo::CompanyRepo;
pub use patrol_session_repo::PatrolSessionRepo;
pub use site_repo::SiteRepo;
