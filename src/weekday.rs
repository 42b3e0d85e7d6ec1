//! Day-of-week aggregation
//!
//! Buckets entries by the weekday their sleep began and averages duration and
//! ratings per bucket. All seven days are always reported; an empty bucket has
//! no averages (`None`), which is distinct from a real zero.

use crate::duration::DurationCalculator;
use crate::types::{DayOfWeek, SleepLogEntry};
use serde::{Deserialize, Serialize};

/// Averages for one weekday
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekStats {
    pub day: DayOfWeek,
    pub count: usize,
    pub avg_duration_hours: Option<f64>,
    pub avg_quality: Option<f64>,
    pub avg_mood: Option<f64>,
    pub avg_energy: Option<f64>,
}

impl DayOfWeekStats {
    fn empty(day: DayOfWeek) -> Self {
        Self {
            day,
            count: 0,
            avg_duration_hours: None,
            avg_quality: None,
            avg_mood: None,
            avg_energy: None,
        }
    }
}

/// Seven buckets, Sunday through Saturday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayBreakdown {
    pub days: [DayOfWeekStats; 7],
}

impl WeekdayBreakdown {
    pub fn get(&self, day: DayOfWeek) -> &DayOfWeekStats {
        &self.days[day.index()]
    }

    /// Buckets with at least one entry, Sunday first
    pub fn non_empty(&self) -> impl Iterator<Item = &DayOfWeekStats> {
        self.days.iter().filter(|d| d.count > 0)
    }
}

/// Argmax/argmin picks over the weekday breakdown
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeekdayInsights {
    pub best_quality_day: Option<DayOfWeek>,
    pub worst_quality_day: Option<DayOfWeek>,
    pub longest_sleep_day: Option<DayOfWeek>,
    pub highest_energy_day: Option<DayOfWeek>,
}

#[derive(Default, Clone, Copy)]
struct Sums {
    count: usize,
    duration: f64,
    quality: f64,
    mood: f64,
    energy: f64,
}

pub struct DayOfWeekAggregator;

impl DayOfWeekAggregator {
    pub fn aggregate(entries: &[SleepLogEntry]) -> WeekdayBreakdown {
        let durations = DurationCalculator::durations(entries);
        Self::aggregate_with_durations(entries, &durations)
    }

    /// Aggregate using precomputed durations (parallel to `entries`)
    pub fn aggregate_with_durations(entries: &[SleepLogEntry], durations: &[f64]) -> WeekdayBreakdown {
        let mut sums = [Sums::default(); 7];

        for (entry, &hours) in entries.iter().zip(durations) {
            let bucket = &mut sums[entry.day_of_week().index()];
            bucket.count += 1;
            bucket.duration += hours;
            bucket.quality += entry.sleep_quality as f64;
            bucket.mood += entry.mood as f64;
            bucket.energy += entry.energy as f64;
        }

        let days = DayOfWeek::ALL.map(|day| {
            let s = sums[day.index()];
            if s.count == 0 {
                return DayOfWeekStats::empty(day);
            }
            let n = s.count as f64;
            DayOfWeekStats {
                day,
                count: s.count,
                avg_duration_hours: Some(s.duration / n),
                avg_quality: Some(s.quality / n),
                avg_mood: Some(s.mood / n),
                avg_energy: Some(s.energy / n),
            }
        });

        WeekdayBreakdown { days }
    }

    /// Best/worst quality, longest sleep and highest energy days.
    /// Ties go to the earliest day in Sunday-first order.
    pub fn insights(breakdown: &WeekdayBreakdown) -> WeekdayInsights {
        WeekdayInsights {
            best_quality_day: pick(breakdown, |d| d.avg_quality, |a, b| a > b),
            worst_quality_day: pick(breakdown, |d| d.avg_quality, |a, b| a < b),
            longest_sleep_day: pick(breakdown, |d| d.avg_duration_hours, |a, b| a > b),
            highest_energy_day: pick(breakdown, |d| d.avg_energy, |a, b| a > b),
        }
    }
}

fn pick<F, C>(breakdown: &WeekdayBreakdown, metric: F, better: C) -> Option<DayOfWeek>
where
    F: Fn(&DayOfWeekStats) -> Option<f64>,
    C: Fn(f64, f64) -> bool,
{
    let mut best: Option<(DayOfWeek, f64)> = None;
    for stats in breakdown.non_empty() {
        let Some(value) = metric(stats) else {
            continue;
        };
        let replace = match best {
            Some((_, current)) => better(value, current),
            None => true,
        };
        if replace {
            best = Some((stats.day, value));
        }
    }
    best.map(|(day, _)| day)
}
