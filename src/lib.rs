//! Sleep Trends - deterministic analytics over a personal sleep log
//!
//! The engine turns a sequence of daily sleep-log entries into a single trend
//! report: duration → consistency → weekday patterns → correlations →
//! prioritized recommendations. It is a pure function of its input: no I/O,
//! no clock, no shared mutable state.
//!
//! ## Modules
//!
//! - **Statistics**: duration, clock-time consistency, Pearson correlation, weekday buckets
//! - **Recommendations**: rule table plus a versioned note keyword vocabulary
//! - **Pipeline**: the `compute_report` entry point used by the UI layer

pub mod circular;
pub mod config;
pub mod correlation;
pub mod duration;
pub mod error;
pub mod keywords;
pub mod log;
pub mod pipeline;
pub mod recommendations;
pub mod types;
pub mod weekday;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{AnalyticsConfig, ConsistencyMethod, RatingPolicy};
pub use error::AnalyticsError;
pub use log::SleepLog;
pub use pipeline::{compute_report, entries_json_to_report, TrendAnalyzer, TrendReport};
pub use types::{Category, ClockTime, DayOfWeek, Priority, Recommendation, SleepLogEntry};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name embedded in every report
pub const PRODUCER_NAME: &str = "sleep-trends";
