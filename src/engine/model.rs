use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CardId = u64;

/// A pond: a named deck with its spaced-repetition interval table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pond {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Days until the next review, indexed by the depth a card moves into
    #[serde(default = "default_intervals")]
    pub review_intervals_days: Vec<u32>,
}

fn default_intervals() -> Vec<u32> {
    vec![1, 3, 7, 16]
}

/// A reviewable card. In the pond it swims as a fish in band `depth_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub prompt: String,
    pub answer: String,
    /// Band index, 0 = shallow. Out-of-range values are clamped at draw time.
    #[serde(default)]
    pub depth_level: i64,
    pub next_review_date: DateTime<Utc>,
}

impl Card {
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }
}

/// The boat the line is cast from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vessel {
    pub x: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn readiness_is_inclusive() {
        let now = Utc::now();
        let mut card = Card {
            id: 1,
            prompt: "q".into(),
            answer: "a".into(),
            depth_level: 0,
            next_review_date: now,
        };
        assert!(card.is_ready(now));
        card.next_review_date = now + Duration::seconds(1);
        assert!(!card.is_ready(now));
    }

    #[test]
    fn pond_intervals_default_when_missing() {
        let pond: Pond = serde_json::from_str(r#"{"id": 3, "name": "Kanji"}"#).unwrap();
        assert_eq!(pond.review_intervals_days, vec![1, 3, 7, 16]);
        assert!(pond.description.is_empty());
    }
}
