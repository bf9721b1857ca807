/// Primary keys of the `bosssec_config` table (SQLite INTEGER PRIMARY KEY).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
