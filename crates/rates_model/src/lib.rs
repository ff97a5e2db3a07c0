use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

mod integral;

pub const BASE_CURRENCY: &str = "EUR";

const SHARD_FILE_NAME: &str = "data.json";

/// Currency code to rate, kept in the order the currencies were published.
pub type Rates = IndexMap<String, f64>;

/// Reference rates published for one calendar date, quoted against `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub date: NaiveDate,
    pub base: String,
    #[serde(serialize_with = "integral::serialize")]
    pub rates: Rates,
}

impl DailyRate {
    pub fn new(date: NaiveDate, rates: Rates) -> Self {
        return DailyRate {
            date,
            base: BASE_CURRENCY.to_string(),
            rates,
        };
    }
}

/// Calendar month a record belongs to; one on-disk shard per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        return MonthKey { year, month };
    }

    /// Shard location relative to the data directory: `YYYY/MM/data.json`.
    pub fn relative_path(&self) -> PathBuf {
        [
            format!("{:04}", self.year),
            format!("{:02}", self.month),
            SHARD_FILE_NAME.to_string(),
        ]
        .iter()
        .collect()
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        MonthKey::new(date.year(), date.month())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}/{:02}", self.year, self.month)
    }
}

/// Partitions records by month. Records keep their input order inside a bucket.
pub fn group_by_month(rates: Vec<DailyRate>) -> BTreeMap<MonthKey, Vec<DailyRate>> {
    rates
        .into_iter()
        .into_group_map_by(|rate| MonthKey::from(rate.date))
        .into_iter()
        .collect()
}

/// Newest record by date. On equal dates the first one seen is kept.
pub fn find_latest(rates: &[DailyRate]) -> Option<&DailyRate> {
    rates
        .iter()
        .reduce(|latest, current| if current.date > latest.date { current } else { latest })
}

/// Unions two record lists by date, newest first. `incoming` wins on collisions.
pub fn merge_rates(existing: Vec<DailyRate>, incoming: Vec<DailyRate>) -> Vec<DailyRate> {
    let mut by_date = BTreeMap::new();
    for rate in existing.into_iter().chain(incoming) {
        by_date.insert(rate.date, rate);
    }
    by_date.into_values().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rate(day: &str, pairs: &[(&str, f64)]) -> DailyRate {
        DailyRate::new(
            date(day),
            pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
        )
    }

    #[test]
    fn month_key_pass_display_zero_padded() {
        assert_eq!(MonthKey::from(date("2024-01-02")).to_string(), "2024/01");
        assert_eq!(MonthKey::from(date("1999-12-31")).to_string(), "1999/12");
    }

    #[test]
    fn month_key_pass_relative_path() {
        let path = MonthKey::new(2024, 2).relative_path();
        assert_eq!(path, PathBuf::from("2024").join("02").join("data.json"));
    }

    #[test]
    fn group_by_month_pass_partition() {
        let input = vec![
            rate("2024-02-01", &[("USD", 1.12)]),
            rate("2024-01-03", &[("USD", 1.09)]),
            rate("2024-01-02", &[("USD", 1.10)]),
            rate("2023-12-29", &[("USD", 1.11)]),
        ];

        let grouped = group_by_month(input.clone());

        assert_eq!(grouped.len(), 3);
        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, input.len());
        for (key, bucket) in &grouped {
            for entry in bucket {
                assert_eq!(MonthKey::from(entry.date), *key);
                assert!(input.contains(entry));
            }
        }
    }

    #[test]
    fn group_by_month_pass_keeps_input_order() {
        let input = vec![
            rate("2024-01-03", &[("USD", 1.09)]),
            rate("2024-01-10", &[("USD", 1.08)]),
            rate("2024-01-02", &[("USD", 1.10)]),
        ];

        let grouped = group_by_month(input.clone());

        assert_eq!(grouped[&MonthKey::new(2024, 1)], input);
    }

    #[test]
    fn group_by_month_pass_empty() {
        assert!(group_by_month(vec![]).is_empty());
    }

    #[test]
    fn find_latest_pass_empty() {
        assert_eq!(find_latest(&[]), None);
    }

    #[test]
    fn find_latest_pass_newest_anywhere() {
        let input = vec![
            rate("2024-01-02", &[("USD", 1.10)]),
            rate("2024-02-01", &[("USD", 1.12)]),
            rate("2024-01-15", &[("USD", 1.11)]),
        ];
        assert_eq!(find_latest(&input).unwrap().date, date("2024-02-01"));
    }

    #[test]
    fn find_latest_pass_first_wins_on_tie() {
        let input = vec![
            rate("2024-02-01", &[("USD", 1.12)]),
            rate("2024-02-01", &[("USD", 9.99)]),
        ];
        assert_eq!(find_latest(&input).unwrap().rates["USD"], 1.12);
    }

    #[test]
    fn merge_rates_pass_incoming_wins() {
        let existing = vec![rate("2024-01-01", &[("USD", 1.1)])];
        let incoming = vec![rate("2024-01-01", &[("USD", 1.2)])];

        let merged = merge_rates(existing, incoming);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rates["USD"], 1.2);
    }

    #[test]
    fn merge_rates_pass_replaces_whole_record() {
        let existing = vec![rate("2024-01-01", &[("USD", 1.1), ("JPY", 160.0)])];
        let incoming = vec![rate("2024-01-01", &[("USD", 1.2)])];

        let merged = merge_rates(existing, incoming);

        assert_eq!(merged[0].rates.len(), 1);
        assert!(!merged[0].rates.contains_key("JPY"));
    }

    #[test]
    fn merge_rates_pass_sorted_descending() {
        let existing = vec![
            rate("2024-01-03", &[("USD", 1.09)]),
            rate("2024-01-01", &[("USD", 1.1)]),
        ];
        let incoming = vec![
            rate("2024-01-02", &[("USD", 1.2)]),
            rate("2024-01-04", &[("USD", 1.3)]),
        ];

        let dates: Vec<String> = merge_rates(existing, incoming)
            .iter()
            .map(|r| r.date.to_string())
            .collect();

        assert_eq!(dates, vec!["2024-01-04", "2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    #[test]
    fn merge_rates_pass_idempotent() {
        let input = vec![
            rate("2024-01-02", &[("USD", 1.10)]),
            rate("2024-01-05", &[("USD", 1.09)]),
            rate("2024-01-02", &[("USD", 1.10)]),
        ];

        let merged = merge_rates(input.clone(), input);

        let dates: Vec<NaiveDate> = merged.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2024-01-05"), date("2024-01-02")]);
    }

    #[test]
    fn daily_rate_pass_json_shape() {
        let value = serde_json::to_value(rate("2024-01-02", &[("USD", 1.1), ("JPY", 160.0)])).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "date": "2024-01-02",
                "base": "EUR",
                "rates": {"JPY": 160, "USD": 1.1}
            })
        );
    }

    #[test]
    fn daily_rate_pass_keeps_rate_order() {
        let json = serde_json::to_string(&rate(
            "2024-01-02",
            &[("USD", 1.1), ("JPY", 160.0), ("BGN", 1.9558)],
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-01-02","base":"EUR","rates":{"USD":1.1,"JPY":160,"BGN":1.9558}}"#
        );

        let parsed: DailyRate = serde_json::from_str(&json).unwrap();
        let currencies: Vec<&str> = parsed.rates.keys().map(String::as_str).collect();
        assert_eq!(currencies, vec!["USD", "JPY", "BGN"]);
    }

    #[test]
    fn daily_rate_pass_reads_integer_rates() {
        let parsed: DailyRate = serde_json::from_str(
            r#"{"date":"2024-01-02","base":"EUR","rates":{"JPY":160,"USD":1.1}}"#,
        )
        .unwrap();
        assert_eq!(parsed, rate("2024-01-02", &[("USD", 1.1), ("JPY", 160.0)]));
    }
}
