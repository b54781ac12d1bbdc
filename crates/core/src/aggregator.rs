//! Summary tables over the enriched record set.
//!
//! Every function here is a pure read over the records it is handed; nothing
//! is cached between calls.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use linkify::{LinkFinder, LinkKind};

use crate::domain::{
    DayCount, EnrichedRecord, Insights, MonthCount, ParticipantFilter, PeriodMatrix, UserCount,
    VocabularyEntry,
};
use crate::features::{period_labels, DAY_NAMES, MONTH_NAMES};
use crate::tokenizer::count_words;

pub const TOP_USERS_LIMIT: usize = 20;

/// Body of a message whose attachment was left out of the export.
pub const MEDIA_MARKER: &str = "<Media omitted>\n";

// Schemeless hosts count too; email addresses do not.
static LINK_FINDER: LazyLock<LinkFinder> = LazyLock::new(|| {
    let mut finder = LinkFinder::new();
    finder.url_must_have_scheme(false);
    finder.kinds(&[LinkKind::Url]);
    finder
});

pub fn filter_records<'a>(
    records: &'a [EnrichedRecord],
    filter: &ParticipantFilter,
) -> Vec<&'a EnrichedRecord> {
    records.iter().filter(|r| filter.matches(r.author())).collect()
}

pub fn gather_insights(records: &[EnrichedRecord], filter: &ParticipantFilter) -> Insights {
    let selected = filter_records(records, filter);
    Insights {
        total_messages: selected.len(),
        total_words: total_words(&selected),
        total_media_shared: total_media(&selected),
        total_links_shared: total_links(&selected),
        monthly_activity: monthly_activity(&selected),
        daily_activity: daily_activity(&selected),
        most_busy_days: most_busy_days(&selected),
        most_busy_months: most_busy_months(&selected),
        periodwise_activity: periodwise_activity(&selected),
        most_busy_users: most_busy_users(&selected),
    }
}

pub fn total_words(records: &[&EnrichedRecord]) -> usize {
    records.iter().map(|r| count_words(r.body())).sum()
}

pub fn total_media(records: &[&EnrichedRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.body().contains(MEDIA_MARKER))
        .count()
}

pub fn count_links(text: &str) -> usize {
    LINK_FINDER.links(text).count()
}

pub fn total_links(records: &[&EnrichedRecord]) -> usize {
    records.iter().map(|r| count_links(r.body())).sum()
}

/// Messages per calendar month, oldest first.
pub fn monthly_activity(records: &[&EnrichedRecord]) -> Vec<MonthCount> {
    let mut grouped: BTreeMap<(i32, u32), (&str, usize)> = BTreeMap::new();
    for record in records {
        let ts = record.message.timestamp;
        grouped
            .entry((ts.year(), ts.month()))
            .or_insert((record.month_year_key.as_str(), 0))
            .1 += 1;
    }
    grouped
        .into_values()
        .map(|(month, num_messages)| MonthCount {
            month: month.to_string(),
            num_messages,
        })
        .collect()
}

/// Messages per calendar day, oldest first.
pub fn daily_activity(records: &[&EnrichedRecord]) -> Vec<DayCount> {
    let mut grouped: BTreeMap<NaiveDate, (&str, usize)> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.message.timestamp.date())
            .or_insert((record.day_month_year_key.as_str(), 0))
            .1 += 1;
    }
    grouped
        .into_values()
        .map(|(day, num_messages)| DayCount {
            day: day.to_string(),
            num_messages,
        })
        .collect()
}

/// Weekdays with at least one message, busiest first. Ties keep Monday-first order.
pub fn most_busy_days(records: &[&EnrichedRecord]) -> Vec<DayCount> {
    let mut counts = [0usize; 7];
    for record in records {
        counts[record.message.timestamp.weekday().num_days_from_monday() as usize] += 1;
    }
    let mut days: Vec<DayCount> = DAY_NAMES
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(day, num_messages)| DayCount {
            day: (*day).to_string(),
            num_messages,
        })
        .collect();
    days.sort_by(|a, b| b.num_messages.cmp(&a.num_messages));
    days
}

/// Month names (across years) with at least one message, busiest first.
pub fn most_busy_months(records: &[&EnrichedRecord]) -> Vec<MonthCount> {
    let mut counts = [0usize; 12];
    for record in records {
        counts[record.message.timestamp.month0() as usize] += 1;
    }
    let mut months: Vec<MonthCount> = MONTH_NAMES
        .iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(month, num_messages)| MonthCount {
            month: (*month).to_string(),
            num_messages,
        })
        .collect();
    months.sort_by(|a, b| b.num_messages.cmp(&a.num_messages));
    months
}

/// Full weekday x period grid; empty cells are 0.
pub fn periodwise_activity(records: &[&EnrichedRecord]) -> PeriodMatrix {
    let mut counts = vec![vec![0usize; 24]; 7];
    for record in records {
        let day = record.message.timestamp.weekday().num_days_from_monday() as usize;
        counts[day][record.hour as usize] += 1;
    }
    PeriodMatrix {
        days: DAY_NAMES.iter().map(|d| (*d).to_string()).collect(),
        periods: period_labels(),
        counts,
    }
}

/// Top participants by message count. Ties keep first-appearance order.
pub fn most_busy_users(records: &[&EnrichedRecord]) -> Vec<UserCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let author = record.author();
        let count = counts.entry(author).or_insert_with(|| {
            order.push(author);
            0
        });
        *count += 1;
    }
    let mut users: Vec<UserCount> = order
        .into_iter()
        .map(|username| UserCount {
            username: username.to_string(),
            num_messages: counts[username],
        })
        .collect();
    users.sort_by(|a, b| b.num_messages.cmp(&a.num_messages));
    users.truncate(TOP_USERS_LIMIT);
    users
}

/// The `limit` most frequent words. Ties keep first-encountered order.
pub fn top_words(words: &[String], limit: usize) -> Vec<VocabularyEntry> {
    let mut entries: Vec<VocabularyEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for word in words {
        match index.get(word.as_str()) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                index.insert(word, entries.len());
                entries.push(VocabularyEntry {
                    term: word.clone(),
                    count: 1,
                });
            }
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}
