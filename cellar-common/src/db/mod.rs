//! SQLite persistence for the advisor's external collaborators
//!
//! - `profiles`: structural profile cache keyed by wine id
//! - `rotation`: recently recommended bottles per scope
//! - `consumption`: bottles opened per user

pub mod consumption;
pub mod init;
pub mod profiles;
pub mod rotation;

pub use init::{init_database, init_in_memory};

use chrono::{DateTime, Utc};

/// Decode a stored millisecond timestamp
pub(crate) fn from_millis(ms: i64) -> crate::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| crate::Error::Internal(format!("Invalid stored timestamp: {}", ms)))
}
