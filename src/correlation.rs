//! Pearson correlation between rating series

use crate::types::{CorrelationDirection, CorrelationStrength};
use serde::{Deserialize, Serialize};

/// Minimum paired samples before a coefficient is computed
pub const MIN_CORRELATION_SAMPLES: usize = 3;

/// A correlation coefficient with its reporting interpretation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

impl CorrelationResult {
    pub fn from_coefficient(coefficient: f64) -> Self {
        Self {
            coefficient,
            strength: CorrelationAnalyzer::strength(coefficient),
            direction: CorrelationAnalyzer::direction(coefficient),
        }
    }
}

pub struct CorrelationAnalyzer;

impl CorrelationAnalyzer {
    /// Pearson product-moment correlation of `x` and `y`.
    ///
    /// Returns 0 when the lengths differ, fewer than three pairs are given,
    /// or either series has no variance.
    pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.len() < MIN_CORRELATION_SAMPLES {
            return 0.0;
        }
        if is_constant(x) || is_constant(y) {
            return 0.0;
        }

        let n = x.len() as f64;
        let sum_x: f64 = x.iter().sum();
        let sum_y: f64 = y.iter().sum();
        let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        let sum_x2: f64 = x.iter().map(|a| a * a).sum();
        let sum_y2: f64 = y.iter().map(|b| b * b).sum();

        let numerator = n * sum_xy - sum_x * sum_y;
        let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

        if !denominator.is_finite() || denominator <= 0.0 {
            return 0.0;
        }

        (numerator / denominator).clamp(-1.0, 1.0)
    }

    pub fn strength(coefficient: f64) -> CorrelationStrength {
        let r = coefficient.abs();
        if r < 0.2 {
            CorrelationStrength::Negligible
        } else if r < 0.4 {
            CorrelationStrength::Weak
        } else if r < 0.6 {
            CorrelationStrength::Moderate
        } else if r < 0.8 {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }

    pub fn direction(coefficient: f64) -> CorrelationDirection {
        if coefficient < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::Positive
        }
    }

    pub fn analyze(x: &[f64], y: &[f64]) -> CorrelationResult {
        CorrelationResult::from_coefficient(Self::correlation(x, y))
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}
