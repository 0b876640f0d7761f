//! Download file names.
//!
//! Names follow `{sanitized-prefix}[-YYYY-MM-DD-HHMM].{ext}`. The date part is
//! the UTC calendar date and `HHMM` is the wall-clock time of the caller, so the
//! two can disagree around midnight.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Replace every character outside `[a-zA-Z0-9.-]` with `_`
pub fn sanitize_filename(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Timestamp suffix `-YYYY-MM-DD-HHMM`: UTC date, time in the zone of `now`
pub fn timestamp_suffix<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "-{}-{}",
        now.with_timezone(&Utc).format("%Y-%m-%d"),
        now.format("%H%M")
    )
}

/// Build a file name using the current local time
pub fn generate_filename(prefix: &str, extension: &str, include_timestamp: bool) -> String {
    generate_filename_at(prefix, extension, include_timestamp, &Local::now())
}

/// Build a file name for a given point in time
pub fn generate_filename_at<Tz>(
    prefix: &str,
    extension: &str,
    include_timestamp: bool,
    now: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut filename = sanitize_filename(prefix);
    if include_timestamp {
        filename.push_str(&timestamp_suffix(now));
    }
    filename.push('.');
    filename.push_str(extension);
    filename
}
