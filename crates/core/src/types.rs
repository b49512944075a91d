/// Server-generated primary keys are PostgreSQL BIGSERIAL.
///
/// Client-owned entities (users, vehicles, drives, AI jobs) use
/// client-generated string identifiers instead and are typed `String`.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
