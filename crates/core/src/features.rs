//! Derived temporal fields for parsed records.

use chrono::{Datelike, Timelike};

use crate::domain::{EnrichedRecord, MessageRecord};
use crate::utils::{day_month_year_key, month_year_key};

pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Label of the one-hour bucket starting at `hour`.
///
/// Hour 0 renders as "00 - 1" and hour 23 as "23 - 00"; other buckets are
/// unpadded ("5 - 6"). The asymmetric padding matches existing reports.
pub fn period_label(hour: u32) -> String {
    match hour {
        23 => "23 - 00".to_string(),
        0 => "00 - 1".to_string(),
        h => format!("{} - {}", h, h + 1),
    }
}

/// All 24 period labels in clock order.
pub fn period_labels() -> Vec<String> {
    (0..24).map(period_label).collect()
}

pub fn enrich(message: MessageRecord) -> EnrichedRecord {
    let ts = message.timestamp;
    let hour = ts.hour();
    EnrichedRecord {
        year: ts.year(),
        month_name: ts.format("%B").to_string(),
        day_of_month: ts.day(),
        day_name: ts.format("%A").to_string(),
        time_of_day: ts.time(),
        month_year_key: month_year_key(&ts),
        day_month_year_key: day_month_year_key(&ts),
        hour,
        period: period_label(hour),
        message,
    }
}

pub fn enrich_all(records: Vec<MessageRecord>) -> Vec<EnrichedRecord> {
    records.into_iter().map(enrich).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn message(hour: u32, minute: u32) -> MessageRecord {
        MessageRecord {
            timestamp: NaiveDate::from_ymd_opt(2023, 3, 5)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap(),
            author: "Alice".to_string(),
            body: "hi\n".to_string(),
        }
    }

    #[test]
    fn test_period_label_boundaries() {
        assert_eq!(period_label(23), "23 - 00");
        assert_eq!(period_label(0), "00 - 1");
        assert_eq!(period_label(5), "5 - 6");
        assert_eq!(period_label(12), "12 - 13");
    }

    #[test]
    fn test_period_labels_cover_the_day() {
        let labels = period_labels();
        assert_eq!(labels.len(), 24);
        assert_eq!(labels.first().map(String::as_str), Some("00 - 1"));
        assert_eq!(labels.last().map(String::as_str), Some("23 - 00"));
    }

    #[test]
    fn test_enrich_derives_all_fields() {
        let enriched = enrich(message(14, 7));
        assert_eq!(enriched.year, 2023);
        assert_eq!(enriched.month_name, "March");
        assert_eq!(enriched.day_of_month, 5);
        assert_eq!(enriched.day_name, "Sunday");
        assert_eq!(enriched.time_of_day, NaiveTime::from_hms_opt(14, 7, 0).unwrap());
        assert_eq!(enriched.month_year_key, "March-2023");
        assert_eq!(enriched.day_month_year_key, "5-March-2023");
        assert_eq!(enriched.hour, 14);
        assert_eq!(enriched.period, "14 - 15");
        assert_eq!(enriched.author(), "Alice");
    }

    #[test]
    fn test_enrich_all_preserves_order() {
        let enriched = enrich_all(vec![message(1, 0), message(0, 30)]);
        assert_eq!(enriched[0].period, "1 - 2");
        assert_eq!(enriched[1].period, "00 - 1");
    }
}
