//! Level history log
//!
//! Every played level leaves exactly one record, appended when the level
//! ends (completion, skip, regenerate, mode or language switch).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::WORDS_PER_LEVEL;
use crate::puzzle::Provenance;

/// One played level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub level: u32,
    /// e.g. `Scripture (english)`
    pub mode: String,
    pub elapsed_seconds: u32,
    pub hints_used: u32,
    /// Word points minus hint costs; may be negative
    pub points_earned: i64,
    pub words_found: usize,
    pub total_words: usize,
    pub completed: bool,
    /// Scripture provenance per target word
    #[serde(default)]
    pub verse_map: BTreeMap<String, Provenance>,
    /// Unix timestamp (ms) when the level started
    pub timestamp: f64,
}

impl LevelRecord {
    pub fn new(level: u32, mode: String, timestamp: f64) -> Self {
        Self {
            level,
            mode,
            elapsed_seconds: 0,
            hints_used: 0,
            points_earned: 0,
            words_found: 0,
            total_words: WORDS_PER_LEVEL,
            completed: false,
            verse_map: BTreeMap::new(),
            timestamp,
        }
    }
}

/// Append-only list of records, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct History {
    entries: Vec<LevelRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LevelRecord) {
        self.entries.push(record);
    }

    /// Records as shown in the history viewer
    pub fn most_recent_first(&self) -> impl Iterator<Item = &LevelRecord> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of points over all records
    pub fn total_points(&self) -> i64 {
        self.entries.iter().map(|r| r.points_earned).sum()
    }
}

/// Format a timestamp as a local date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
    String::from(date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED))
}

/// Format a timestamp as `YYYY-MM-DD HH:MM UTC`
#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(timestamp: f64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp as i64)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH)
        .format("%Y-%m-%d %H:%M UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: u32, points: i64) -> LevelRecord {
        let mut r = LevelRecord::new(level, "Standard (english)".into(), 0.0);
        r.points_earned = points;
        r
    }

    #[test]
    fn test_new_record_defaults() {
        let r = LevelRecord::new(3, "Scripture (romanian)".into(), 1.0);
        assert_eq!(r.total_words, 10);
        assert!(!r.completed);
        assert_eq!(r.points_earned, 0);
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = History::new();
        history.push(record(1, 120));
        history.push(record(2, -75));
        let levels: Vec<_> = history.most_recent_first().map(|r| r.level).collect();
        assert_eq!(levels, [2, 1]);
        assert_eq!(history.total_points(), 45);
    }

    #[test]
    fn test_history_is_a_json_array() {
        let mut history = History::new();
        history.push(record(1, 30));
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0.0), "1970-01-01 00:00 UTC");
        // 2024-02-29T13:45:00Z
        assert_eq!(format_date(1_709_214_300_000.0), "2024-02-29 13:45 UTC");
    }

    #[test]
    fn test_format_date_out_of_range_falls_back_to_epoch() {
        assert_eq!(format_date(f64::MAX), "1970-01-01 00:00 UTC");
        assert_eq!(format_date(-1.0e300), "1970-01-01 00:00 UTC");
    }
}
