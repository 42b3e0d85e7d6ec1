//! Analytics configuration
//!
//! All tunables the engine reads live here. A config is plain data: it can be
//! loaded from JSON, and any field left out falls back to its default.

use crate::error::AnalyticsError;
use crate::keywords::KeywordTable;
use serde::{Deserialize, Serialize};

/// Default nightly sleep target used for sleep debt (hours)
pub const DEFAULT_TARGET_SLEEP_HOURS: f64 = 8.0;

/// How out-of-range ratings are handled before analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingPolicy {
    /// Fail the whole report with `RatingOutOfRange`
    #[default]
    Reject,
    /// Clamp each rating into its documented range
    Clamp,
    /// Use ratings as given
    PassThrough,
}

/// Method used to score clock-time consistency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMethod {
    /// Linear standard deviation after shifting evening times back one day
    #[default]
    DayBoundary,
    /// Circular standard deviation on the 24-hour clock
    Angular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub rating_policy: RatingPolicy,
    pub consistency_method: ConsistencyMethod,
    pub target_sleep_hours: f64,
    pub keywords: KeywordTable,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            rating_policy: RatingPolicy::default(),
            consistency_method: ConsistencyMethod::default(),
            target_sleep_hours: DEFAULT_TARGET_SLEEP_HOURS,
            keywords: KeywordTable::default(),
        }
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !(self.target_sleep_hours > 0.0 && self.target_sleep_hours <= 24.0) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "target_sleep_hours must be in (0, 24], got {}",
                self.target_sleep_hours
            )));
        }

        let empty = self.keywords.empty_rules();
        if !empty.is_empty() {
            return Err(AnalyticsError::InvalidConfig(format!(
                "keyword rules without keywords: {empty:?}"
            )));
        }

        Ok(())
    }

    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
