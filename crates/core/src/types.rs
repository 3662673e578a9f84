/// Organizational records and sessions are keyed by opaque strings
/// (e.g. `"comp1712"`, or a UUID for sessions).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
