//! Sleep duration
//!
//! Converts a bedtime/wake-time pair into elapsed hours. Wake times that are
//! not later than the bedtime are read as belonging to the following day.

use crate::types::{ClockTime, SleepLogEntry, MINUTES_PER_DAY};

/// Calculator for per-entry sleep duration
pub struct DurationCalculator;

impl DurationCalculator {
    /// Hours slept between `bed` and `wake`, always in (0, 24]
    pub fn duration(bed: ClockTime, wake: ClockTime) -> f64 {
        let mut minutes = wake.minutes_since_midnight() - bed.minutes_since_midnight();
        // Identical times count as a full day rather than zero sleep
        if minutes <= 0 {
            minutes += MINUTES_PER_DAY;
        }
        minutes as f64 / 60.0
    }

    pub fn entry_duration(entry: &SleepLogEntry) -> f64 {
        Self::duration(entry.bed_time, entry.wake_time)
    }

    /// Durations for every entry, in input order
    pub fn durations(entries: &[SleepLogEntry]) -> Vec<f64> {
        entries.iter().map(Self::entry_duration).collect()
    }
}
