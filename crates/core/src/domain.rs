use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Author assigned to lines without an attributable sender.
pub const GROUP_NOTIFICATION: &str = "group notification";

/// Synthetic participant that selects the unfiltered record set.
pub const ALL_MEMBERS: &str = "All members";

/// One transcript entry as it appears in the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub body: String,
}

/// A message plus the temporal fields used for grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub message: MessageRecord,
    pub year: i32,
    pub month_name: String,
    pub day_of_month: u32,
    pub day_name: String,
    pub time_of_day: NaiveTime,
    pub month_year_key: String,
    pub day_month_year_key: String,
    pub hour: u32,
    pub period: String,
}

impl EnrichedRecord {
    pub fn author(&self) -> &str {
        &self.message.author
    }

    pub fn body(&self) -> &str {
        &self.message.body
    }
}

/// Scope of an aggregation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantFilter {
    All,
    Member(String),
}

impl ParticipantFilter {
    /// Maps a participant-list selection back to a filter.
    pub fn from_selection(selection: &str) -> Self {
        if selection == ALL_MEMBERS {
            Self::All
        } else {
            Self::Member(selection.to_string())
        }
    }

    pub fn matches(&self, author: &str) -> bool {
        match self {
            Self::All => true,
            Self::Member(name) => name == author,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_MEMBERS,
            Self::Member(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub num_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: String,
    pub num_messages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCount {
    pub username: String,
    pub num_messages: usize,
}

/// Day-name rows by period-label columns. Every cell is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodMatrix {
    pub days: Vec<String>,
    pub periods: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl PeriodMatrix {
    pub fn get(&self, day: &str, period: &str) -> Option<usize> {
        let row = self.days.iter().position(|d| d == day)?;
        let col = self.periods.iter().position(|p| p == period)?;
        Some(self.counts[row][col])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub total_messages: usize,
    pub total_words: usize,
    pub total_media_shared: usize,
    pub total_links_shared: usize,
    pub monthly_activity: Vec<MonthCount>,
    pub daily_activity: Vec<DayCount>,
    pub most_busy_days: Vec<DayCount>,
    pub most_busy_months: Vec<MonthCount>,
    pub periodwise_activity: PeriodMatrix,
    pub most_busy_users: Vec<UserCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    pub term: String,
    pub count: usize,
}

/// Everything the presentation side needs for one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub member: String,
    pub participants: Vec<String>,
    pub insights: Insights,
    pub vocabulary: Vec<VocabularyEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_selection_all_members() {
        assert_eq!(ParticipantFilter::from_selection("All members"), ParticipantFilter::All);
    }

    #[test]
    fn test_filter_from_selection_member() {
        let filter = ParticipantFilter::from_selection("Alice");
        assert_eq!(filter, ParticipantFilter::Member("Alice".to_string()));
        assert!(filter.matches("Alice"));
        assert!(!filter.matches("Bob"));
        assert_eq!(filter.label(), "Alice");
    }

    #[test]
    fn test_filter_all_matches_everyone() {
        assert!(ParticipantFilter::All.matches("Alice"));
        assert!(ParticipantFilter::All.matches(GROUP_NOTIFICATION));
        assert_eq!(ParticipantFilter::All.label(), ALL_MEMBERS);
    }

    #[test]
    fn test_period_matrix_lookup() {
        let matrix = PeriodMatrix {
            days: vec!["Monday".to_string()],
            periods: vec!["9 - 10".to_string(), "10 - 11".to_string()],
            counts: vec![vec![0, 3]],
        };
        assert_eq!(matrix.get("Monday", "10 - 11"), Some(3));
        assert_eq!(matrix.get("Monday", "9 - 10"), Some(0));
        assert_eq!(matrix.get("Sunday", "9 - 10"), None);
    }
}
