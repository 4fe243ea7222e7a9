pub mod schema;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::error::Result;

/// Open a connection, creating the parent directory on first use.
/// Stores use one connection per operation, so this is called often
/// and must stay cheap.
pub fn open(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Connection::open(db_path)?)
}

pub fn init_memory_db(db_path: &Path) -> Result<()> {
    let conn = open(db_path)?;
    schema::create_memory_tables(&conn)
}

pub fn init_task_db(db_path: &Path) -> Result<()> {
    let conn = open(db_path)?;
    schema::create_task_tables(&conn)
}

/// Timestamps are stored as second-precision UTC RFC3339 text
/// ("2025-01-30T09:00:00Z"). Fixed width keeps lexicographic ordering
/// equal to chronological ordering, which the range queries rely on.
pub fn to_stored(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn from_stored(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn now_stored() -> String {
    to_stored(Utc::now())
}
