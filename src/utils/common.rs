//! Common utility functions

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::RngCore;

/// Date format with time
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert DateTime to the canonical string format
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a canonical datetime string
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT)
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

/// Get current UTC datetime
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a string to asterisks (for masking passwords in logs)
pub fn mask_string(s: &str) -> String {
    "*".repeat(s.chars().count())
}

/// Fill a buffer with random bytes (salts and IVs)
pub fn random_bytes(buf: &mut [u8]) {
    rand::rng().fill_bytes(buf);
}
