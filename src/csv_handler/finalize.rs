//! Document finalization: byte-order mark and filename decoration.

use chrono::{DateTime, Utc};

/// The byte-order mark prefixed when `include_bom` is set.
pub const BOM: char = '\u{FEFF}';

/// Extension stripped and re-added around the filename timestamp.
pub const CSV_EXTENSION: &str = ".csv";

/// Timestamp layout used in filenames: ISO 8601 with `-` in place of `:`,
/// no fractional seconds and no zone suffix.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats `at` as a filename-safe timestamp token.
#[must_use]
pub fn timestamp_token(at: DateTime<Utc>) -> String {
    at.format(FILENAME_TIMESTAMP_FORMAT).to_string()
}

/// Computes the final filename.
///
/// Without a timestamp the filename is returned unchanged. With one, a
/// trailing `.csv` is removed, `-<timestamp>` appended and `.csv` re-added.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use csv_export::csv_handler::decorate_filename;
///
/// let at = Utc.with_ymd_and_hms(2023, 12, 25, 10, 30, 45).unwrap();
/// assert_eq!(decorate_filename("test.csv", Some(at)), "test-2023-12-25T10-30-45.csv");
/// assert_eq!(decorate_filename("test.csv", None), "test.csv");
/// ```
#[must_use]
pub fn decorate_filename(filename: &str, timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(at) => {
            let base = filename.strip_suffix(CSV_EXTENSION).unwrap_or(filename);
            format!("{}-{}{}", base, timestamp_token(at), CSV_EXTENSION)
        }
        None => filename.to_string(),
    }
}

/// Prefixes the body with a byte-order mark when requested.
#[must_use]
pub fn apply_bom(body: String, include_bom: bool) -> String {
    if include_bom {
        let mut out = String::with_capacity(body.len() + BOM.len_utf8());
        out.push(BOM);
        out.push_str(&body);
        out
    } else {
        body
    }
}
