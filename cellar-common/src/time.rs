//! Timestamp utilities

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Calendar year of the current UTC timestamp
pub fn current_year() -> i32 {
    now().year()
}

/// Midnight UTC on January 1st of `year`
///
/// Used to pin computation timestamps when a caller supplies only a year,
/// so repeated computations for the same year produce identical output.
pub fn start_of_year(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Longest retention or staleness window accepted anywhere (100 years)
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Convert whole days to a chrono duration, saturating at the representable range
pub fn days(count: i64) -> Duration {
    Duration::try_days(count).unwrap_or(if count < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

/// `at - window`, saturating at the earliest representable timestamp
pub fn before(at: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    at.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
