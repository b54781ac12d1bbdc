use chrono::{Datelike, NaiveDateTime};

/// Composite monthly grouping key, e.g. "March-2023"
pub fn month_year_key(timestamp: &NaiveDateTime) -> String {
    format!("{}-{}", timestamp.format("%B"), timestamp.year())
}

/// Composite daily grouping key, e.g. "5-March-2023" (day not zero-padded)
pub fn day_month_year_key(timestamp: &NaiveDateTime) -> String {
    format!("{}-{}-{}", timestamp.day(), timestamp.format("%B"), timestamp.year())
}

/// Sanitizes a participant name for use in a filename
/// Replaces invalid filename characters with hyphens
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
