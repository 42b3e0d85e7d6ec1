//! Rule-based recommendations
//!
//! Every rule below is evaluated independently and all that apply fire. The
//! resulting list is ordered high -> medium -> low, keeping rule order within
//! a priority.
//!
//! | Signal                 | Threshold   | Priority |
//! |------------------------|-------------|----------|
//! | average duration       | < 6 h       | high     |
//! |                        | 6-7 h       | medium   |
//! |                        | 7-9 h       | low      |
//! |                        | > 9 h       | low      |
//! | average quality        | < 4         | high     |
//! |                        | 4-6         | medium   |
//! |                        | >= 6        | low      |
//! | bed/wake variability   | > 120 min   | high     |
//! |                        | 60-120 min  | medium   |
//! | note keywords          | per topic   | see [`NoteTopic`](crate::keywords::NoteTopic) |

use crate::keywords::KeywordTable;
use crate::types::{Category, Priority, Recommendation};

/// Entries required before any rule is evaluated
pub const MIN_ENTRIES_FOR_RECOMMENDATIONS: usize = 3;

/// Lists shorter than this get the generic fallback advice appended
const MIN_RECOMMENDATIONS: usize = 3;

const HIGH_VARIABILITY_MINUTES: f64 = 120.0;
const MODERATE_VARIABILITY_MINUTES: f64 = 60.0;

/// Aggregate statistics the rules read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationInputs {
    pub entry_count: usize,
    pub avg_duration_hours: f64,
    pub avg_quality: f64,
    pub bedtime_variability_minutes: f64,
    pub wake_variability_minutes: f64,
}

pub struct RecommendationEngine<'a> {
    keywords: &'a KeywordTable,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(keywords: &'a KeywordTable) -> Self {
        Self { keywords }
    }

    /// Build the prioritized recommendation list.
    ///
    /// With fewer than three entries only a single placeholder is returned.
    pub fn recommend<'n, I>(&self, inputs: &RecommendationInputs, notes: I) -> Vec<Recommendation>
    where
        I: IntoIterator<Item = &'n str>,
    {
        if inputs.entry_count < MIN_ENTRIES_FOR_RECOMMENDATIONS {
            return vec![placeholder()];
        }

        let mut recommendations = Vec::new();
        recommendations.push(duration_rule(inputs.avg_duration_hours));
        recommendations.push(quality_rule(inputs.avg_quality));
        recommendations.extend(consistency_rule(inputs.bedtime_variability_minutes, "bedtime"));
        recommendations.extend(consistency_rule(inputs.wake_variability_minutes, "wake time"));
        recommendations.extend(
            self.keywords
                .scan(notes)
                .into_iter()
                .map(|topic| topic.recommendation()),
        );

        if recommendations.len() < MIN_RECOMMENDATIONS {
            recommendations.extend(fallback());
        }

        // Stable: insertion order survives within a priority
        recommendations.sort_by_key(|r| r.priority);
        recommendations
    }
}

fn placeholder() -> Recommendation {
    Recommendation::new(
        Category::GettingStarted,
        Priority::Low,
        "Log at least 3 days of sleep to unlock personalized recommendations.",
    )
}

fn duration_rule(hours: f64) -> Recommendation {
    if hours < 6.0 {
        Recommendation::new(
            Category::SleepDuration,
            Priority::High,
            format!(
                "You are averaging {hours:.1} hours of sleep. Most adults need 7-9 hours; try moving your bedtime earlier in 15-minute steps."
            ),
        )
    } else if hours < 7.0 {
        Recommendation::new(
            Category::SleepDuration,
            Priority::Medium,
            format!(
                "You are averaging {hours:.1} hours of sleep, slightly below the recommended 7-9 hours. An extra 30 minutes a night would close the gap."
            ),
        )
    } else if hours <= 9.0 {
        Recommendation::new(
            Category::SleepDuration,
            Priority::Low,
            format!(
                "Great job! You are averaging {hours:.1} hours of sleep, within the recommended 7-9 hours."
            ),
        )
    } else {
        Recommendation::new(
            Category::SleepDuration,
            Priority::Low,
            format!(
                "You are averaging {hours:.1} hours of sleep, more than the usual 7-9 hours. If you still feel tired, consider talking to a healthcare provider."
            ),
        )
    }
}

fn quality_rule(quality: f64) -> Recommendation {
    if quality < 4.0 {
        Recommendation::new(
            Category::SleepQuality,
            Priority::High,
            format!(
                "Your average sleep quality is {quality:.1}/10. Review your sleep environment for light, noise and temperature, and consider speaking with a sleep specialist."
            ),
        )
    } else if quality < 6.0 {
        Recommendation::new(
            Category::SleepQuality,
            Priority::Medium,
            format!(
                "Your average sleep quality is {quality:.1}/10. A cool, dark, quiet bedroom and a relaxing pre-sleep routine can help."
            ),
        )
    } else {
        Recommendation::new(
            Category::SleepQuality,
            Priority::Low,
            format!("Your average sleep quality is {quality:.1}/10. Keep up the habits that are working for you."),
        )
    }
}

fn consistency_rule(variability_minutes: f64, what: &str) -> Option<Recommendation> {
    if variability_minutes > HIGH_VARIABILITY_MINUTES {
        Some(Recommendation::new(
            Category::SleepConsistency,
            Priority::High,
            format!(
                "Your {what} varies by about {:.0} minutes. Keeping it within 30 minutes every day, weekends included, helps stabilize your body clock.",
                variability_minutes
            ),
        ))
    } else if variability_minutes >= MODERATE_VARIABILITY_MINUTES {
        Some(Recommendation::new(
            Category::SleepConsistency,
            Priority::Medium,
            format!(
                "Your {what} varies by about {:.0} minutes. A more regular schedule could improve how rested you feel.",
                variability_minutes
            ),
        ))
    } else {
        None
    }
}

fn fallback() -> [Recommendation; 2] {
    [
        Recommendation::new(
            Category::SleepEnvironment,
            Priority::Low,
            "Keep your bedroom cool (around 18°C / 65°F), dark and quiet.",
        ),
        Recommendation::new(
            Category::SleepHygiene,
            Priority::Low,
            "Wind down for 30-60 minutes before bed with a screen-free, relaxing routine.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inputs(duration: f64, quality: f64, bed_var: f64, wake_var: f64) -> RecommendationInputs {
        RecommendationInputs {
            entry_count: 7,
            avg_duration_hours: duration,
            avg_quality: quality,
            bedtime_variability_minutes: bed_var,
            wake_variability_minutes: wake_var,
        }
    }

    fn categories(recs: &[Recommendation]) -> Vec<(Category, Priority)> {
        recs.iter().map(|r| (r.category, r.priority)).collect()
    }

    #[test]
    fn test_minimum_data_gate() {
        let table = KeywordTable::default();
        let engine = RecommendationEngine::new(&table);
        let mut gated = inputs(4.0, 2.0, 200.0, 200.0);
        gated.entry_count = 2;

        let recs = engine.recommend(&gated, ["coffee and stress"]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, Category::GettingStarted);
    }

    #[test]
    fn test_healthy_profile_gets_fallback() {
        let table = KeywordTable::default();
        let engine = RecommendationEngine::new(&table);
        let recs = engine.recommend(&inputs(8.0, 8.0, 0.0, 0.0), Vec::<&str>::new());

        assert_eq!(
            categories(&recs),
            vec![
                (Category::SleepDuration, Priority::Low),
                (Category::SleepQuality, Priority::Low),
                (Category::SleepEnvironment, Priority::Low),
                (Category::SleepHygiene, Priority::Low),
            ]
        );
        assert!(recs[0].text.starts_with("Great job"));
    }

    #[test]
    fn test_every_rule_fires() {
        let table = KeywordTable::default();
        let engine = RecommendationEngine::new(&table);
        let notes = ["coffee late", "stressed about work", "phone in bed", "two beers"];
        let recs = engine.recommend(&inputs(5.0, 3.0, 150.0, 90.0), notes);

        assert_eq!(
            categories(&recs),
            vec![
                (Category::SleepDuration, Priority::High),
                (Category::SleepQuality, Priority::High),
                (Category::SleepConsistency, Priority::High),
                (Category::MentalWellbeing, Priority::High),
                (Category::LifestyleFactors, Priority::High),
                (Category::SleepConsistency, Priority::Medium),
                (Category::LifestyleFactors, Priority::Medium),
                (Category::SleepHygiene, Priority::Medium),
            ]
        );
        assert!(recs[2].text.contains("bedtime"));
        assert!(recs[5].text.contains("wake time"));
    }

    #[test]
    fn test_threshold_edges() {
        assert_eq!(duration_rule(5.99).priority, Priority::High);
        assert_eq!(duration_rule(6.0).priority, Priority::Medium);
        assert_eq!(duration_rule(7.0).priority, Priority::Low);
        assert_eq!(duration_rule(9.5).priority, Priority::Low);

        assert_eq!(quality_rule(3.9).priority, Priority::High);
        assert_eq!(quality_rule(4.0).priority, Priority::Medium);
        assert_eq!(quality_rule(6.0).priority, Priority::Low);

        assert!(consistency_rule(59.9, "bedtime").is_none());
        assert_eq!(consistency_rule(60.0, "bedtime").unwrap().priority, Priority::Medium);
        assert_eq!(consistency_rule(120.0, "bedtime").unwrap().priority, Priority::Medium);
        assert_eq!(consistency_rule(120.5, "bedtime").unwrap().priority, Priority::High);
    }

    #[test]
    fn test_output_is_sorted_and_bounded() {
        let table = KeywordTable::default();
        let engine = RecommendationEngine::new(&table);
        for &(d, q, b, w) in &[
            (5.0, 8.0, 70.0, 10.0),
            (6.5, 5.0, 10.0, 130.0),
            (10.0, 2.0, 0.0, 0.0),
        ] {
            let recs = engine.recommend(&inputs(d, q, b, w), ["wine"]);
            assert!(recs.len() >= 3 && recs.len() <= 8);
            assert!(recs.windows(2).all(|p| p[0].priority <= p[1].priority));
        }
    }
}
