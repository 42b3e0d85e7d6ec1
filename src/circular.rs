//! Clock-time consistency
//!
//! Scores how tightly a set of clock times clusters, in minutes of standard
//! deviation. Times wrap at midnight, so a plain linear deviation would score
//! {23:45, 00:15} as nearly a full day apart. The default method shifts
//! evening times back by one day before taking the deviation; the angular
//! method treats times as points on a 24-hour circle.

use crate::config::ConsistencyMethod;
use crate::types::{ClockTime, ConsistencyBand, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Times later than this (minutes since midnight) belong to the previous night
pub const DAY_BOUNDARY_MINUTES: i32 = 18 * 60;

/// Upper bound reported by the angular method for fully dispersed times
const MAX_ANGULAR_DEVIATION_MINUTES: f64 = MINUTES_PER_DAY as f64 / 2.0;

/// Consistency of one series of clock times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyScore {
    /// Standard deviation in minutes (lower = more consistent)
    pub variability_minutes: f64,
    pub band: ConsistencyBand,
    pub samples: usize,
}

pub struct CircularTimeStatistics;

impl CircularTimeStatistics {
    /// Day-boundary corrected population standard deviation, in minutes.
    /// Fewer than two times are trivially consistent.
    pub fn consistency(times: &[ClockTime]) -> f64 {
        if times.len() < 2 {
            return 0.0;
        }

        let corrected: Vec<f64> = times
            .iter()
            .map(|t| shift_past_boundary(t.minutes_since_midnight()) as f64)
            .collect();

        population_std_dev(&corrected)
    }

    /// Circular standard deviation, in minutes
    pub fn angular_consistency(times: &[ClockTime]) -> f64 {
        if times.len() < 2 {
            return 0.0;
        }

        let n = times.len() as f64;
        let (sin_sum, cos_sum) = times.iter().fold((0.0_f64, 0.0_f64), |(s, c), t| {
            let angle = to_angle(t.minutes_since_midnight());
            (s + angle.sin(), c + angle.cos())
        });

        let resultant = ((sin_sum / n).powi(2) + (cos_sum / n).powi(2)).sqrt();
        if resultant >= 1.0 {
            return 0.0;
        }
        if resultant <= f64::EPSILON {
            return MAX_ANGULAR_DEVIATION_MINUTES;
        }

        let radians = (-2.0 * resultant.ln()).sqrt();
        (radians * MINUTES_PER_DAY as f64 / (2.0 * PI)).min(MAX_ANGULAR_DEVIATION_MINUTES)
    }

    /// Score `times` with the chosen method and classify the result
    pub fn score(times: &[ClockTime], method: ConsistencyMethod) -> ConsistencyScore {
        let variability_minutes = match method {
            ConsistencyMethod::DayBoundary => Self::consistency(times),
            ConsistencyMethod::Angular => Self::angular_consistency(times),
        };

        ConsistencyScore {
            variability_minutes,
            band: Self::classify(variability_minutes),
            samples: times.len(),
        }
    }

    pub fn classify(variability_minutes: f64) -> ConsistencyBand {
        if variability_minutes < 30.0 {
            ConsistencyBand::VeryConsistent
        } else if variability_minutes < 60.0 {
            ConsistencyBand::Consistent
        } else if variability_minutes <= 90.0 {
            ConsistencyBand::ModeratelyConsistent
        } else {
            ConsistencyBand::Inconsistent
        }
    }
}

fn shift_past_boundary(minutes: i32) -> i32 {
    if minutes > DAY_BOUNDARY_MINUTES {
        minutes - MINUTES_PER_DAY
    } else {
        minutes
    }
}

fn to_angle(minutes: i32) -> f64 {
    2.0 * PI * minutes as f64 / MINUTES_PER_DAY as f64
}

fn population_std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
