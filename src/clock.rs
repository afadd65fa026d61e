// Wall-clock and cue timestamp formatting.
// Both are pure; output must stay byte-identical for identical inputs.

use chrono::{DateTime, TimeZone, Timelike};

use crate::types::{CueTime, TimeFormat};

/// Format the wall-clock time of `instant` in its own offset.
pub fn format_clock<Tz: TimeZone>(instant: &DateTime<Tz>, format: TimeFormat) -> String {
    let hours = instant.hour();
    let minutes = instant.minute();

    match format {
        TimeFormat::H12 => {
            let h12 = if hours % 12 == 0 { 12 } else { hours % 12 };
            let suffix = if hours < 12 { "AM" } else { "PM" };
            format!("{}:{:02} {}", h12, minutes, suffix)
        }
        TimeFormat::H24 => format!("{:02}:{:02}", hours, minutes),
    }
}

/// WebVTT timestamp (`HH:MM:SS.mmm`) for an offset from document start.
pub fn format_timestamp(offset: CueTime) -> String {
    offset.to_string()
}

/// Seconds-based variant; the fractional part is truncated to milliseconds.
pub fn format_timestamp_secs(offset_secs: f64) -> String {
    format_timestamp(CueTime::from_secs_f64(offset_secs))
}
