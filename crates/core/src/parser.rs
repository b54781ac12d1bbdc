//! Splits an exported chat transcript into message records.
//!
//! Each entry starts with `M/D/YY, H:MM AM - ` and runs until the next such
//! prefix, so bodies may span several physical lines. The sender is taken from
//! the first `name: ` sequence of the entry; a body that itself contains
//! `word: ` before any real delimiter will be misattributed. That imprecision
//! comes with the export format and is kept as is.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::debug;

use crate::domain::{MessageRecord, GROUP_NOTIFICATION};
use crate::error::{ChatError, Result};

/// Two-digit years follow chrono's pivot: `00`-`69` land in the 2000s and
/// `70`-`99` in the 1900s. POSIX `strptime` puts `69` in 1969 instead, so an
/// export dated `3/4/69` reads as 2069 here.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%y, %I:%M %p";

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}/\d{1,2}/\d{2}, \d{1,2}:\d{2}\s[AP]M").expect("Invalid timestamp regex")
});

static ATTRIBUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.+?):\s").expect("Invalid attribution regex"));

/// Parses the whole transcript. Any timestamp that matches the line-start
/// pattern but is not a real date aborts the parse.
pub fn parse_transcript(text: &str) -> Result<Vec<MessageRecord>> {
    let timestamps = TIMESTAMP_RE.find_iter(text).map(|m| m.as_str());
    // Text ahead of the first timestamp belongs to no message.
    let bodies = TIMESTAMP_RE.split(text).skip(1);

    let records = timestamps
        .zip(bodies)
        .enumerate()
        .map(|(index, (raw_timestamp, raw_body))| {
            let timestamp = parse_timestamp(index, raw_timestamp)?;
            let (author, body) = split_attribution(raw_body);
            Ok(MessageRecord {
                timestamp,
                author,
                body,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} records from transcript", records.len());
    Ok(records)
}

/// Number of line-start timestamps in the text.
pub fn count_entries(text: &str) -> usize {
    TIMESTAMP_RE.find_iter(text).count()
}

fn parse_timestamp(index: usize, raw: &str) -> Result<NaiveDateTime> {
    // Newer exports put a narrow no-break space before AM/PM.
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT).map_err(|source| {
        ChatError::MalformedTimestamp {
            index,
            value: raw.to_string(),
            source,
        }
    })
}

/// Separates the sender prefix from the body of one raw entry.
pub fn split_attribution(raw_body: &str) -> (String, String) {
    match ATTRIBUTION_RE.captures(raw_body) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            let author = normalize_author(&caps[1]);
            (author, raw_body[end..].to_string())
        }
        None => (GROUP_NOTIFICATION.to_string(), raw_body.to_string()),
    }
}

fn normalize_author(candidate: &str) -> String {
    let cleaned = candidate.replace('-', "");
    let cleaned = cleaned.trim();
    // "X added Y to the group: ..." style events carry a colon too.
    if cleaned.is_empty() || cleaned.contains("group") {
        GROUP_NOTIFICATION.to_string()
    } else {
        cleaned.to_string()
    }
}
