//! Note keyword scanning
//!
//! Free-text notes are scanned against a small, versioned vocabulary. Each
//! topic that matches any note contributes one recommendation. The table is
//! plain data so it can be replaced wholesale from configuration.

use crate::types::{Category, Priority, Recommendation};
use serde::{Deserialize, Deserializer, Serialize};

/// Version of the built-in vocabulary
pub const DEFAULT_KEYWORD_TABLE_VERSION: u32 = 1;

/// Lifestyle topic detected in notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTopic {
    Caffeine,
    Stress,
    Screens,
    Alcohol,
}

impl NoteTopic {
    pub fn category(&self) -> Category {
        match self {
            NoteTopic::Caffeine => Category::LifestyleFactors,
            NoteTopic::Stress => Category::MentalWellbeing,
            NoteTopic::Screens => Category::SleepHygiene,
            NoteTopic::Alcohol => Category::LifestyleFactors,
        }
    }

    pub fn priority(&self) -> Priority {
        match self {
            NoteTopic::Caffeine => Priority::Medium,
            NoteTopic::Stress => Priority::High,
            NoteTopic::Screens => Priority::Medium,
            NoteTopic::Alcohol => Priority::High,
        }
    }

    fn text(&self) -> &'static str {
        match self {
            NoteTopic::Caffeine => {
                "Your notes mention caffeine. Try to avoid coffee, tea and energy drinks at least 6 hours before bed."
            }
            NoteTopic::Stress => {
                "Your notes mention stress or anxiety. A wind-down routine with breathing exercises or journaling before bed can help quiet a busy mind."
            }
            NoteTopic::Screens => {
                "Your notes mention screen use. Put phones, laptops and TV away 30-60 minutes before bed to limit blue light exposure."
            }
            NoteTopic::Alcohol => {
                "Your notes mention alcohol. Even moderate drinking fragments sleep and suppresses REM; avoid alcohol in the hours before bed."
            }
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation::new(self.category(), self.priority(), self.text())
    }
}

/// Keywords that signal one topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub topic: NoteTopic,
    /// Stored lowercased
    #[serde(deserialize_with = "lowercase_keywords")]
    pub keywords: Vec<String>,
}

fn lowercase_keywords<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let keywords = Vec::<String>::deserialize(deserializer)?;
    Ok(keywords.iter().map(|k| k.to_lowercase()).collect())
}

impl KeywordRule {
    pub fn new(topic: NoteTopic, keywords: &[&str]) -> Self {
        Self {
            topic,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive substring match against already-lowercased text
    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lowered.contains(k.as_str()))
    }
}

/// Versioned keyword vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub version: u32,
    pub rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self {
            version: DEFAULT_KEYWORD_TABLE_VERSION,
            rules: vec![
                KeywordRule::new(
                    NoteTopic::Caffeine,
                    &["caffeine", "coffee", "tea", "energy drink", "espresso", "soda"],
                ),
                KeywordRule::new(
                    NoteTopic::Stress,
                    &["stress", "anxious", "anxiety", "worried", "worry", "overwhelmed"],
                ),
                KeywordRule::new(
                    NoteTopic::Screens,
                    &["phone", "screen", "tv", "laptop", "scrolling", "netflix"],
                ),
                KeywordRule::new(
                    NoteTopic::Alcohol,
                    &[
                        "alcohol", "wine", "beer", "cocktail", "liquor", "spirits", "whiskey", "vodka",
                        "hangover",
                    ],
                ),
            ],
        }
    }
}

impl KeywordTable {
    /// Topics matched by any of `notes`, in table order, each at most once.
    /// Empty or whitespace-only notes are skipped.
    pub fn scan<'a, I>(&self, notes: I) -> Vec<NoteTopic>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lowered: Vec<String> = notes
            .into_iter()
            .filter(|n| !n.trim().is_empty())
            .map(|n| n.to_lowercase())
            .collect();

        let mut topics = Vec::new();
        for rule in &self.rules {
            if topics.contains(&rule.topic) {
                continue;
            }
            if lowered.iter().any(|note| rule.matches(note)) {
                topics.push(rule.topic);
            }
        }
        topics
    }

    /// Rules with no usable keyword
    pub fn empty_rules(&self) -> Vec<NoteTopic> {
        self.rules
            .iter()
            .filter(|r| r.keywords.iter().all(|k| k.trim().is_empty()))
            .map(|r| r.topic)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_is_case_insensitive() {
        let table = KeywordTable::default();
        let topics = table.scan(["Had two COFFEES after lunch"]);
        assert_eq!(topics, vec![NoteTopic::Caffeine]);
    }

    #[test]
    fn test_scan_reports_each_topic_once_in_table_order() {
        let table = KeywordTable::default();
        let notes = [
            "wine with dinner",
            "work stress, lots of anxiety",
            "coffee late",
            "more coffee",
        ];
        let topics = table.scan(notes);
        assert_eq!(
            topics,
            vec![NoteTopic::Caffeine, NoteTopic::Stress, NoteTopic::Alcohol]
        );
    }

    #[test]
    fn test_scan_skips_empty_notes() {
        let table = KeywordTable::default();
        assert!(table.scan(["", "   "]).is_empty());
        assert!(table.scan(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_energy_drink_is_only_caffeine() {
        let table = KeywordTable::default();
        assert_eq!(table.scan(["energy drink"]), vec![NoteTopic::Caffeine]);
        assert_eq!(
            table.scan(["had an energy drink at 3pm"]),
            vec![NoteTopic::Caffeine]
        );
        assert_eq!(table.scan(["two glasses of wine"]), vec![NoteTopic::Alcohol]);
    }

    #[test]
    fn test_deserialized_keywords_are_lowercased() {
        let json = r#"{"version": 2, "rules": [{"topic": "stress", "keywords": ["Deadline", "EXAM"]}]}"#;
        let table: KeywordTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.rules[0].keywords, vec!["deadline", "exam"]);
        assert_eq!(table.scan(["Big exam tomorrow"]), vec![NoteTopic::Stress]);
    }

    #[test]
    fn test_custom_table() {
        let table = KeywordTable {
            version: 7,
            rules: vec![KeywordRule::new(NoteTopic::Screens, &["Doomscrolling"])],
        };
        assert_eq!(table.scan(["late doomscrolling"]), vec![NoteTopic::Screens]);
        assert!(table.scan(["coffee"]).is_empty());
    }

    #[test]
    fn test_topic_recommendations() {
        let stress = NoteTopic::Stress.recommendation();
        assert_eq!(stress.category, Category::MentalWellbeing);
        assert_eq!(stress.priority, Priority::High);

        let alcohol = NoteTopic::Alcohol.recommendation();
        assert_eq!(alcohol.category, Category::LifestyleFactors);
        assert_eq!(alcohol.priority, Priority::High);

        assert_eq!(NoteTopic::Screens.priority(), Priority::Medium);
    }
}
