//! Core types for the sleep trend engine
//!
//! This module defines the data that flows through the analytics pipeline:
//! log entries on the way in, and the closed enumerations and result records
//! that make up a trend report on the way out.

use crate::error::AnalyticsError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Inclusive range of the sleep quality rating
pub const SLEEP_QUALITY_RANGE: (i32, i32) = (1, 10);

/// Inclusive range of the mood rating
pub const MOOD_RANGE: (i32, i32) = (1, 5);

/// Inclusive range of the energy rating
pub const ENERGY_RANGE: (i32, i32) = (1, 5);

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Wall-clock time of day without a date component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Create a time of day, rejecting hours above 23 and minutes above 59
    pub fn new(hour: u8, minute: u8) -> Result<Self, AnalyticsError> {
        if hour > 23 || minute > 59 {
            return Err(AnalyticsError::InvalidTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since midnight (0-1439)
    pub fn minutes_since_midnight(&self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = AnalyticsError;

    /// Parse `"HH:MM"` or `"H:MM"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnalyticsError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;

        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One user-submitted record of one sleep episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepLogEntry {
    /// Opaque identifier, assigned at creation. Entries parsed without one
    /// get an id derived from their content and input position.
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    /// Calendar date on which the sleep began
    pub date: NaiveDate,
    pub bed_time: ClockTime,
    /// Treated as next-day when not later than `bed_time`
    pub wake_time: ClockTime,
    /// Subjective quality, 1-10
    pub sleep_quality: i32,
    /// Subjective mood, 1-5
    pub mood: i32,
    /// Subjective energy, 1-5
    pub energy: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SleepLogEntry {
    /// Create an entry with a fresh identifier
    pub fn new(
        date: NaiveDate,
        bed_time: ClockTime,
        wake_time: ClockTime,
        sleep_quality: i32,
        mood: i32,
        energy: i32,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            bed_time,
            wake_time,
            sleep_quality,
            mood,
            energy,
            notes,
        }
    }

    /// Check every rating against its documented range
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        check_range("sleepQuality", self.sleep_quality, SLEEP_QUALITY_RANGE)?;
        check_range("mood", self.mood, MOOD_RANGE)?;
        check_range("energy", self.energy, ENERGY_RANGE)?;
        Ok(())
    }

    /// Copy of this entry with every rating clamped into range
    pub fn clamped(&self) -> Self {
        Self {
            sleep_quality: self
                .sleep_quality
                .clamp(SLEEP_QUALITY_RANGE.0, SLEEP_QUALITY_RANGE.1),
            mood: self.mood.clamp(MOOD_RANGE.0, MOOD_RANGE.1),
            energy: self.energy.clamp(ENERGY_RANGE.0, ENERGY_RANGE.1),
            ..self.clone()
        }
    }

    /// Non-empty notes, if any
    pub fn notes_text(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }

    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from(self.date.weekday())
    }

    /// Fill a missing (nil) id with a name-based UUID over the entry's
    /// position, date and times, so the same input always gets the same id
    pub fn assign_stable_id(&mut self, index: usize) {
        if !self.id.is_nil() {
            return;
        }
        let name = format!("{}|{}|{}|{}", index, self.date, self.bed_time, self.wake_time);
        self.id = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
    }
}

fn check_range(field: &'static str, value: i32, range: (i32, i32)) -> Result<(), AnalyticsError> {
    if value < range.0 || value > range.1 {
        return Err(AnalyticsError::RatingOutOfRange {
            field,
            value,
            min: range.0,
            max: range.1,
        });
    }
    Ok(())
}

/// Day of the week, in Sunday-first reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Position in Sunday-first order (0-6)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        DayOfWeek::ALL[weekday.num_days_from_sunday() as usize]
    }
}

/// Recommendation priority; declaration order is display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    SleepDuration,
    SleepQuality,
    SleepConsistency,
    LifestyleFactors,
    MentalWellbeing,
    SleepHygiene,
    SleepEnvironment,
    GettingStarted,
}

impl Category {
    /// Text shown to the user for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::SleepDuration => "Sleep Duration",
            Category::SleepQuality => "Sleep Quality",
            Category::SleepConsistency => "Sleep Consistency",
            Category::LifestyleFactors => "Lifestyle Factors",
            Category::MentalWellbeing => "Mental Wellbeing",
            Category::SleepHygiene => "Sleep Hygiene",
            Category::SleepEnvironment => "Sleep Environment",
            Category::GettingStarted => "Getting Started",
        }
    }
}

/// A single prioritized recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    pub text: String,
    pub priority: Priority,
}

impl Recommendation {
    pub fn new(category: Category, priority: Priority, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            priority,
        }
    }
}

/// Classification of a clock-time variability figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyBand {
    VeryConsistent,
    Consistent,
    ModeratelyConsistent,
    Inconsistent,
}

impl ConsistencyBand {
    pub fn label(&self) -> &'static str {
        match self {
            ConsistencyBand::VeryConsistent => "very consistent",
            ConsistencyBand::Consistent => "consistent",
            ConsistencyBand::ModeratelyConsistent => "moderately consistent",
            ConsistencyBand::Inconsistent => "inconsistent",
        }
    }
}

/// Strength of a correlation coefficient, by absolute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn label(&self) -> &'static str {
        match self {
            CorrelationStrength::Negligible => "little/none",
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::VeryStrong => "very strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}
