//! Report orchestration
//!
//! This module provides the public API for the engine. It runs the stages
//! over an immutable snapshot of the log and assembles a single report:
//!
//! 1. Rating policy - reject, clamp or pass through out-of-range ratings
//! 2. DurationCalculator - per-entry hours, computed once
//! 3. CircularTimeStatistics - bedtime and wake-time consistency
//! 4. DayOfWeekAggregator - weekday buckets and insights
//! 5. CorrelationAnalyzer - quality vs duration, mood and energy
//! 6. RecommendationEngine - prioritized advice
//!
//! The computation reads no clock and no random state, so identical input
//! always produces an identical report.

use crate::circular::{CircularTimeStatistics, ConsistencyScore};
use crate::config::{AnalyticsConfig, RatingPolicy};
use crate::correlation::{CorrelationAnalyzer, CorrelationResult};
use crate::duration::DurationCalculator;
use crate::error::AnalyticsError;
use crate::log::parse_entries;
use crate::recommendations::{RecommendationEngine, RecommendationInputs};
use crate::types::{ClockTime, Recommendation, SleepLogEntry};
use crate::weekday::{DayOfWeekAggregator, WeekdayBreakdown, WeekdayInsights};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;

/// Static producer metadata embedded in every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
}

/// Duration of one entry, in input order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryDuration {
    pub id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
}

/// Collection-level averages and sleep debt
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SleepSummary {
    pub avg_duration_hours: Option<f64>,
    pub avg_quality: Option<f64>,
    pub avg_mood: Option<f64>,
    pub avg_energy: Option<f64>,
    pub shortest_sleep_hours: Option<f64>,
    pub longest_sleep_hours: Option<f64>,
    pub target_sleep_hours: f64,
    /// Sum of nightly shortfalls below the target
    pub total_sleep_debt_hours: f64,
    pub avg_sleep_debt_hours: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Sleep quality correlated against the other tracked metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSet {
    pub quality_vs_duration: CorrelationResult,
    pub quality_vs_mood: CorrelationResult,
    pub quality_vs_energy: CorrelationResult,
}

/// Everything the UI layer needs to render trends and advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub producer: ReportProducer,
    pub entry_count: usize,
    pub durations: Vec<EntryDuration>,
    pub summary: SleepSummary,
    pub bedtime_consistency: ConsistencyScore,
    pub wake_consistency: ConsistencyScore,
    pub weekdays: WeekdayBreakdown,
    pub insights: WeekdayInsights,
    pub correlations: CorrelationSet,
    pub recommendations: Vec<Recommendation>,
    pub keyword_table_version: u32,
}

/// Compute a trend report with the default configuration.
///
/// # Example
/// ```ignore
/// let report = compute_report(log.entries())?;
/// for rec in &report.recommendations {
///     println!("[{}] {}", rec.priority.as_str(), rec.text);
/// }
/// ```
pub fn compute_report(entries: &[SleepLogEntry]) -> Result<TrendReport, AnalyticsError> {
    TrendAnalyzer::default().compute_report(entries)
}

/// Parse a JSON array of entries and return the report as JSON.
///
/// Per-entry durations are reported in the order the entries were given.
pub fn entries_json_to_report(entries_json: &str) -> Result<String, AnalyticsError> {
    let entries = parse_entries(entries_json)?;
    let report = compute_report(&entries)?;
    report_to_json(&report)
}

pub fn report_to_json(report: &TrendReport) -> Result<String, AnalyticsError> {
    serde_json::to_string_pretty(report).map_err(AnalyticsError::JsonError)
}

/// Stateless analyzer bound to one configuration.
///
/// `Send + Sync`; every call works on its own snapshot of the entries.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: AnalyticsConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn compute_report(&self, entries: &[SleepLogEntry]) -> Result<TrendReport, AnalyticsError> {
        let entries = self.apply_rating_policy(entries)?;
        let entries = entries.as_ref();

        tracing::debug!(entries = entries.len(), "computing trend report");

        // Stage 2: durations, once per entry
        let durations = DurationCalculator::durations(entries);

        // Stage 3: consistency of bed and wake times
        let bed_times: Vec<ClockTime> = entries.iter().map(|e| e.bed_time).collect();
        let wake_times: Vec<ClockTime> = entries.iter().map(|e| e.wake_time).collect();
        let method = self.config.consistency_method;
        let bedtime_consistency = CircularTimeStatistics::score(&bed_times, method);
        let wake_consistency = CircularTimeStatistics::score(&wake_times, method);

        // Stage 4: weekday buckets
        let weekdays = DayOfWeekAggregator::aggregate_with_durations(entries, &durations);
        let insights = DayOfWeekAggregator::insights(&weekdays);

        // Stage 5: correlations, quality always on the x side
        let correlations = correlate(entries, &durations);

        let summary = summarize(entries, &durations, self.config.target_sleep_hours);

        // Stage 6: recommendations
        let recommendations = self.recommend(
            entries,
            &summary,
            &bedtime_consistency,
            &wake_consistency,
        );

        Ok(TrendReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
            },
            entry_count: entries.len(),
            durations: entries
                .iter()
                .zip(&durations)
                .map(|(e, &hours)| EntryDuration {
                    id: e.id,
                    date: e.date,
                    hours,
                })
                .collect(),
            summary,
            bedtime_consistency,
            wake_consistency,
            weekdays,
            insights,
            correlations,
            recommendations,
            keyword_table_version: self.config.keywords.version,
        })
    }

    /// Only the prioritized recommendation list
    pub fn recommendations(
        &self,
        entries: &[SleepLogEntry],
    ) -> Result<Vec<Recommendation>, AnalyticsError> {
        Ok(self.compute_report(entries)?.recommendations)
    }

    fn apply_rating_policy<'a>(
        &self,
        entries: &'a [SleepLogEntry],
    ) -> Result<Cow<'a, [SleepLogEntry]>, AnalyticsError> {
        match self.config.rating_policy {
            RatingPolicy::PassThrough => Ok(Cow::Borrowed(entries)),
            RatingPolicy::Reject => {
                for entry in entries {
                    entry.validate()?;
                }
                Ok(Cow::Borrowed(entries))
            }
            RatingPolicy::Clamp => {
                let clamped: Vec<SleepLogEntry> = entries
                    .iter()
                    .map(|entry| {
                        if entry.validate().is_err() {
                            tracing::warn!(entry_id = %entry.id, date = %entry.date, "clamping out-of-range rating");
                            entry.clamped()
                        } else {
                            entry.clone()
                        }
                    })
                    .collect();
                Ok(Cow::Owned(clamped))
            }
        }
    }

    fn recommend(
        &self,
        entries: &[SleepLogEntry],
        summary: &SleepSummary,
        bedtime: &ConsistencyScore,
        wake: &ConsistencyScore,
    ) -> Vec<Recommendation> {
        let inputs = RecommendationInputs {
            entry_count: entries.len(),
            avg_duration_hours: summary.avg_duration_hours.unwrap_or(0.0),
            avg_quality: summary.avg_quality.unwrap_or(0.0),
            bedtime_variability_minutes: bedtime.variability_minutes,
            wake_variability_minutes: wake.variability_minutes,
        };

        if inputs.entry_count < crate::recommendations::MIN_ENTRIES_FOR_RECOMMENDATIONS {
            tracing::warn!(entries = inputs.entry_count, "not enough entries for recommendations");
        }

        RecommendationEngine::new(&self.config.keywords)
            .recommend(&inputs, entries.iter().filter_map(|e| e.notes_text()))
    }
}

fn correlate(entries: &[SleepLogEntry], durations: &[f64]) -> CorrelationSet {
    let quality: Vec<f64> = entries.iter().map(|e| e.sleep_quality as f64).collect();
    let mood: Vec<f64> = entries.iter().map(|e| e.mood as f64).collect();
    let energy: Vec<f64> = entries.iter().map(|e| e.energy as f64).collect();

    CorrelationSet {
        quality_vs_duration: CorrelationAnalyzer::analyze(&quality, durations),
        quality_vs_mood: CorrelationAnalyzer::analyze(&quality, &mood),
        quality_vs_energy: CorrelationAnalyzer::analyze(&quality, &energy),
    }
}

fn summarize(entries: &[SleepLogEntry], durations: &[f64], target_hours: f64) -> SleepSummary {
    let total_sleep_debt_hours: f64 = durations
        .iter()
        .map(|&hours| (target_hours - hours).max(0.0))
        .sum();

    SleepSummary {
        avg_duration_hours: mean(durations.iter().copied()),
        avg_quality: mean(entries.iter().map(|e| e.sleep_quality as f64)),
        avg_mood: mean(entries.iter().map(|e| e.mood as f64)),
        avg_energy: mean(entries.iter().map(|e| e.energy as f64)),
        shortest_sleep_hours: durations.iter().copied().reduce(f64::min),
        longest_sleep_hours: durations.iter().copied().reduce(f64::max),
        target_sleep_hours: target_hours,
        total_sleep_debt_hours,
        avg_sleep_debt_hours: (!durations.is_empty())
            .then(|| total_sleep_debt_hours / durations.len() as f64),
        first_date: entries.iter().map(|e| e.date).min(),
        last_date: entries.iter().map(|e| e.date).max(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsistencyMethod;
    use crate::types::{Category, ConsistencyBand, DayOfWeek, Priority};
    use pretty_assertions::assert_eq;

    fn entry(date: &str, bed: &str, wake: &str, quality: i32, mood: i32, energy: i32) -> SleepLogEntry {
        SleepLogEntry::new(
            date.parse().unwrap(),
            bed.parse().unwrap(),
            wake.parse().unwrap(),
            quality,
            mood,
            energy,
            None,
        )
    }

    fn steady_week() -> Vec<SleepLogEntry> {
        (15..22)
            .map(|day| entry(&format!("2024-01-{day}"), "23:00", "07:00", 8, 4, 4))
            .collect()
    }

    #[test]
    fn test_steady_week() {
        let report = compute_report(&steady_week()).unwrap();

        assert_eq!(report.entry_count, 7);
        assert!(report.durations.iter().all(|d| (d.hours - 8.0).abs() < 1e-9));
        assert!(report.bedtime_consistency.variability_minutes.abs() < 1e-9);
        assert!(report.wake_consistency.variability_minutes.abs() < 1e-9);
        assert_eq!(report.bedtime_consistency.band, ConsistencyBand::VeryConsistent);

        // Constant quality has no variance
        assert_eq!(report.correlations.quality_vs_duration.coefficient, 0.0);
        assert_eq!(report.correlations.quality_vs_mood.coefficient, 0.0);

        let duration = report
            .recommendations
            .iter()
            .find(|r| r.category == Category::SleepDuration)
            .unwrap();
        assert_eq!(duration.priority, Priority::Low);
        let quality = report
            .recommendations
            .iter()
            .find(|r| r.category == Category::SleepQuality)
            .unwrap();
        assert_eq!(quality.priority, Priority::Low);
        assert!(!report
            .recommendations
            .iter()
            .any(|r| r.category == Category::SleepConsistency));

        assert!(report.weekdays.days.iter().all(|d| d.count == 1));
        assert_eq!(report.summary.total_sleep_debt_hours, 0.0);
    }

    #[test]
    fn test_bedtimes_across_midnight() {
        let entries = vec![
            entry("2024-01-15", "22:00", "06:00", 6, 3, 3),
            entry("2024-01-16", "00:30", "07:00", 5, 3, 2),
            entry("2024-01-17", "23:45", "07:00", 7, 4, 4),
        ];
        let report = compute_report(&entries).unwrap();
        let hours = report.bedtime_consistency.variability_minutes / 60.0;
        assert!(hours > 1.0 && hours < 1.5, "spread was {hours} hours");
    }

    #[test]
    fn test_gate_with_two_entries() {
        let week = steady_week();
        let report = compute_report(&week[..2]).unwrap();
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].category, Category::GettingStarted);
    }

    #[test]
    fn test_empty_log() {
        let report = compute_report(&[]).unwrap();
        assert_eq!(report.entry_count, 0);
        assert_eq!(report.summary.avg_duration_hours, None);
        assert_eq!(report.summary.avg_sleep_debt_hours, None);
        assert_eq!(report.weekdays.days.len(), 7);
        assert_eq!(report.insights, WeekdayInsights::default());
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let mut entries = steady_week();
        entries[2].sleep_quality = 5;
        entries[4].wake_time = "08:15".parse().unwrap();
        entries[5].notes = Some("late coffee".to_string());

        let first = compute_report(&entries).unwrap();
        let second = compute_report(&entries).unwrap();
        assert_eq!(first, second);
        assert_eq!(report_to_json(&first).unwrap(), report_to_json(&second).unwrap());
    }

    #[test]
    fn test_correlations_and_insights() {
        let entries = vec![
            entry("2024-01-14", "23:00", "07:30", 9, 5, 5), // Sunday
            entry("2024-01-15", "00:30", "06:00", 4, 2, 2), // Monday
            entry("2024-01-16", "23:30", "07:00", 7, 4, 3), // Tuesday
            entry("2024-01-17", "01:00", "06:00", 3, 2, 1), // Wednesday
        ];
        let report = compute_report(&entries).unwrap();

        assert!(report.correlations.quality_vs_duration.coefficient > 0.8);
        assert!(report.correlations.quality_vs_mood.coefficient > 0.8);
        assert_eq!(report.insights.best_quality_day, Some(DayOfWeek::Sunday));
        assert_eq!(report.insights.worst_quality_day, Some(DayOfWeek::Wednesday));
        assert_eq!(report.insights.longest_sleep_day, Some(DayOfWeek::Sunday));

        // Shortfalls below 8h: 0 + 2.5 + 0.5 + 3
        assert!((report.summary.total_sleep_debt_hours - 6.0).abs() < 1e-9);
        assert_eq!(report.summary.shortest_sleep_hours, Some(5.0));
        assert_eq!(report.summary.first_date, NaiveDate::from_ymd_opt(2024, 1, 14));
    }

    #[test]
    fn test_reject_policy() {
        let mut entries = steady_week();
        entries[3].energy = 9;
        let result = compute_report(&entries);
        assert!(matches!(
            result,
            Err(AnalyticsError::RatingOutOfRange { field: "energy", .. })
        ));
    }

    #[test]
    fn test_clamp_and_pass_through_policies() {
        let mut entries = steady_week();
        entries[0].sleep_quality = 15;

        let clamp = TrendAnalyzer::new(AnalyticsConfig {
            rating_policy: RatingPolicy::Clamp,
            ..Default::default()
        })
        .unwrap();
        let report = clamp.compute_report(&entries).unwrap();
        let expected = (10.0 + 8.0 * 6.0) / 7.0;
        assert!((report.summary.avg_quality.unwrap() - expected).abs() < 1e-9);

        let pass = TrendAnalyzer::new(AnalyticsConfig {
            rating_policy: RatingPolicy::PassThrough,
            ..Default::default()
        })
        .unwrap();
        let report = pass.compute_report(&entries).unwrap();
        let expected = (15.0 + 8.0 * 6.0) / 7.0;
        assert!((report.summary.avg_quality.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_angular_method() {
        let analyzer = TrendAnalyzer::new(AnalyticsConfig {
            consistency_method: ConsistencyMethod::Angular,
            ..Default::default()
        })
        .unwrap();
        let report = analyzer.compute_report(&steady_week()).unwrap();
        assert!(report.bedtime_consistency.variability_minutes < 1e-3);
    }

    #[test]
    fn test_notes_drive_recommendations() {
        let mut entries = steady_week();
        entries[1].notes = Some("Felt anxious about a deadline".to_string());
        let recs = TrendAnalyzer::default().recommendations(&entries).unwrap();
        assert_eq!(recs[0].category, Category::MentalWellbeing);
        assert_eq!(recs[0].priority, Priority::High);
    }

    #[test]
    fn test_entries_json_to_report() {
        let json = r#"[
            {"date": "2024-01-15", "bedTime": "23:00", "wakeTime": "07:00", "sleepQuality": 8, "mood": 4, "energy": 4},
            {"date": "2024-01-16", "bedTime": "23:15", "wakeTime": "06:45", "sleepQuality": 7, "mood": 3, "energy": 3},
            {"date": "2024-01-17", "bedTime": "22:45", "wakeTime": "07:15", "sleepQuality": 9, "mood": 5, "energy": 4, "notes": "wine"}
        ]"#;
        let output = entries_json_to_report(json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["entry_count"], 3);
        assert_eq!(value["weekdays"]["days"].as_array().unwrap().len(), 7);
        assert!(value["weekdays"]["days"][0]["avg_quality"].is_null());
        assert_eq!(value["recommendations"][0]["priority"], "high");
        assert_eq!(value["recommendations"][0]["category"], "lifestyle_factors");
    }

    #[test]
    fn test_entries_json_without_ids_is_deterministic() {
        let json = r#"[
            {"date": "2024-01-17", "bedTime": "22:45", "wakeTime": "07:15", "sleepQuality": 9, "mood": 5, "energy": 4},
            {"date": "2024-01-15", "bedTime": "23:00", "wakeTime": "07:00", "sleepQuality": 8, "mood": 4, "energy": 4},
            {"date": "2024-01-16", "bedTime": "23:15", "wakeTime": "06:45", "sleepQuality": 7, "mood": 3, "energy": 3}
        ]"#;
        let first = entries_json_to_report(json).unwrap();
        let second = entries_json_to_report(json).unwrap();
        assert_eq!(first, second);

        // durations follow the caller's order, not the calendar
        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        let dates: Vec<&str> = value["durations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-17", "2024-01-15", "2024-01-16"]);
        assert_eq!(value["durations"][0]["hours"], 8.5);
    }

    #[test]
    fn test_analyzer_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrendAnalyzer>();
        assert_send_sync::<TrendReport>();

        let analyzer = TrendAnalyzer::default();
        let entries = steady_week();
        let expected = analyzer.compute_report(&entries).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| analyzer.compute_report(&entries).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_invalid_json() {
        assert!(entries_json_to_report("not valid json").is_err());
    }
}
