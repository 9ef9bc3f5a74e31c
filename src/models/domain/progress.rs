use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::domain::content::Difficulty;

/// Number of most recent scores considered by [`adaptive_difficulty`].
pub const ADAPTIVE_WINDOW: usize = 5;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Progress {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub topic: String,
    pub difficulty_level: Difficulty,
    pub score: f64,
    #[serde(default)]
    pub data: Value,
    pub completed_at: DateTime<Utc>,
}

impl Progress {
    pub fn new(user_id: &str, topic: &str, difficulty_level: Difficulty, score: f64) -> Self {
        let now = Utc::now();
        Progress {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            topic: topic.to_string(),
            difficulty_level,
            score,
            data: json!({ "last_updated": now.to_rfc3339() }),
            completed_at: now,
        }
    }
}

/// Suggests the next difficulty from the most recent scores on a topic.
///
/// Scores are expected newest first; only the first [`ADAPTIVE_WINDOW`] are
/// averaged. An average of 80 or more suggests hard, 60 or more medium, and
/// anything lower easy. No history suggests medium.
pub fn adaptive_difficulty(recent_scores: &[f64]) -> Difficulty {
    let window = &recent_scores[..recent_scores.len().min(ADAPTIVE_WINDOW)];
    if window.is_empty() {
        return Difficulty::Medium;
    }

    let average = window.iter().sum::<f64>() / window.len() as f64;
    if average >= 80.0 {
        Difficulty::Hard
    } else if average >= 60.0 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}
