use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::record::DfmRecord;

/// Duration for list entries: `M:SS`, minutes unpadded
pub fn format_list_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Duration for the live timer: `MM:SS`
pub fn format_timer(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Session date for list entries, e.g. `Monday · 5 Jan 2026`
pub fn format_record_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format("%A · %-d %b %Y").to_string()
}

/// One list line: local date and `M:SS` duration
pub fn format_record_line(record: &DfmRecord) -> String {
    let date = record
        .started_at_local()
        .map(|t| format_record_date(&t))
        .unwrap_or_else(|| "Unknown date".to_string());

    format!("{}  {}", date, format_list_duration(record.duration_seconds))
}

/// Confirmation shown before saving
pub fn save_prompt(kick_target: u32, elapsed_seconds: u64) -> String {
    format!(
        "You recorded {} kicks in {}.",
        kick_target,
        format_timer(elapsed_seconds)
    )
}
