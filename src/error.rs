//! Error types for sleep trend analytics

use thiserror::Error;

/// Errors that can occur while building or analysing a sleep log
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Rating out of range: {field} = {value} (expected {min}-{max})")]
    RatingOutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse sleep log: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
