//! Sleep log collection
//!
//! The caller-owned, chronologically ordered set of entries the engine reads.
//! Entries are appended or the whole log is cleared; individual entries are
//! never edited in place.

use crate::error::AnalyticsError;
use crate::types::SleepLogEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SleepLog {
    entries: Vec<SleepLogEntry>,
}

/// A validation failure tied to its position in the input
#[derive(Debug)]
pub struct EntryValidationError {
    pub index: usize,
    pub entry_id: String,
    pub error: AnalyticsError,
}

impl SleepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from entries in any order
    pub fn from_entries(entries: Vec<SleepLogEntry>) -> Self {
        let mut log = Self { entries };
        log.entries.sort_by_key(|e| e.date);
        log
    }

    /// Insert after every entry with the same or an earlier date
    pub fn push(&mut self, entry: SleepLogEntry) {
        let at = self.entries.partition_point(|e| e.date <= entry.date);
        self.entries.insert(at, entry);
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SleepLogEntry] {
        &self.entries
    }

    /// Validate every entry, collecting failures instead of stopping at the first
    pub fn validate(&self) -> Vec<EntryValidationError> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.validate().err().map(|error| EntryValidationError {
                    index,
                    entry_id: entry.id.to_string(),
                    error,
                })
            })
            .collect()
    }

    /// Parse a JSON array of entries into a chronologically ordered log
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        Ok(Self::from_entries(parse_entries(json)?))
    }

    /// Parse newline-delimited JSON, one entry per line
    pub fn parse_ndjson(input: &str) -> Result<Self, AnalyticsError> {
        let mut entries = Vec::new();
        for (line_no, line) in input.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut entry: SleepLogEntry = serde_json::from_str(trimmed).map_err(|e| {
                AnalyticsError::ParseError(format!("line {}: {}", line_no + 1, e))
            })?;
            entry.assign_stable_id(entries.len());
            entries.push(entry);
        }
        Ok(Self::from_entries(entries))
    }

    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string(&self.entries)?)
    }
}

/// Parse a JSON array of entries, keeping the caller's order.
///
/// Entries without an `id` get one derived from their position and content.
pub fn parse_entries(json: &str) -> Result<Vec<SleepLogEntry>, AnalyticsError> {
    let mut entries: Vec<SleepLogEntry> = serde_json::from_str(json)?;
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.assign_stable_id(index);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClockTime;
    use chrono::NaiveDate;

    fn entry(day: u32, quality: i32) -> SleepLogEntry {
        SleepLogEntry::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            ClockTime::new(23, 0).unwrap(),
            ClockTime::new(7, 0).unwrap(),
            quality,
            3,
            3,
            None,
        )
    }

    #[test]
    fn test_push_keeps_chronological_order() {
        let mut log = SleepLog::new();
        log.push(entry(17, 5));
        log.push(entry(15, 6));
        log.push(entry(17, 7));
        log.push(entry(16, 8));

        let qualities: Vec<i32> = log.entries().iter().map(|e| e.sleep_quality).collect();
        assert_eq!(qualities, vec![6, 8, 5, 7]);
    }

    #[test]
    fn test_clear() {
        let mut log = SleepLog::from_entries(vec![entry(15, 5), entry(16, 5)]);
        assert_eq!(log.len(), 2);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_json_roundtrip_preserves_ids() {
        let log = SleepLog::from_entries(vec![entry(15, 5), entry(16, 9)]);
        let json = log.to_json().unwrap();
        let loaded = SleepLog::from_json(&json).unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn test_parse_entries_keeps_order_and_derives_ids() {
        let json = r#"[
            {"date": "2024-01-16", "bedTime": "23:30", "wakeTime": "07:00", "sleepQuality": 7, "mood": 4, "energy": 4},
            {"date": "2024-01-15", "bedTime": "22:45", "wakeTime": "06:30", "sleepQuality": 6, "mood": 3, "energy": 3}
        ]"#;
        let first = parse_entries(json).unwrap();
        let second = parse_entries(json).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|e| !e.id.is_nil()));
        assert_eq!(first[0].sleep_quality, 7);

        let log = SleepLog::from_json(json).unwrap();
        assert_eq!(log.entries()[0].sleep_quality, 6);
        assert_eq!(log.entries()[0].id, first[1].id);
    }

    #[test]
    fn test_parse_ndjson() {
        let input = r#"
{"date": "2024-01-16", "bedTime": "23:30", "wakeTime": "07:00", "sleepQuality": 7, "mood": 4, "energy": 4}

{"date": "2024-01-15", "bedTime": "22:45", "wakeTime": "06:30", "sleepQuality": 6, "mood": 3, "energy": 3, "notes": "coffee"}
"#;
        let log = SleepLog::parse_ndjson(input).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].notes.as_deref(), Some("coffee"));
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let input = "{\"date\": \"2024-01-16\", \"bedTime\": \"25:00\", \"wakeTime\": \"07:00\", \"sleepQuality\": 7, \"mood\": 4, \"energy\": 4}";
        match SleepLog::parse_ndjson(input) {
            Err(AnalyticsError::ParseError(msg)) => assert!(msg.starts_with("line 1")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_collects_all_failures() {
        let log = SleepLog::from_entries(vec![entry(15, 0), entry(16, 5), entry(17, 11)]);
        let failures = log.validate();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 0);
        assert_eq!(failures[1].index, 2);
    }
}
