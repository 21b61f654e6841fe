//! Read-only summaries for display: player insights and session reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::question::Category;

/// Skill at or above which an established category counts as strong.
pub const STRONG_SKILL: f64 = 0.7;

/// Skill below which an established category counts as weak.
pub const WEAK_SKILL: f64 = 0.4;

/// Snapshot of the player's standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub current_difficulty: f64,
    /// Mean skill level across played categories
    pub skill_level: f64,
    pub strong_categories: Vec<Category>,
    pub weak_categories: Vec<Category>,
    /// Accuracy over the recent performance window
    pub recent_accuracy: f64,
}

/// Aggregate report produced when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub average_response_time_ms: f64,
    pub starting_difficulty: f64,
    pub ending_difficulty: f64,
    pub categories: Vec<Category>,
}

impl SessionSummary {
    /// Change in difficulty over the session.
    pub fn difficulty_delta(&self) -> f64 {
        self.ending_difficulty - self.starting_difficulty
    }
}

/// Running counters for the current session.
#[derive(Debug, Clone)]
pub(crate) struct SessionTracker {
    id: Uuid,
    started_at: DateTime<Utc>,
    answered: u32,
    correct: u32,
    total_time_ms: f64,
    starting_difficulty: f64,
    categories: BTreeSet<Category>,
}

impl SessionTracker {
    pub(crate) fn start(starting_difficulty: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            answered: 0,
            correct: 0,
            total_time_ms: 0.0,
            starting_difficulty,
            categories: BTreeSet::new(),
        }
    }

    /// Count an answer and return the session accuracy including it.
    pub(crate) fn record(&mut self, category: Category, is_correct: bool, time_ms: f64) -> f64 {
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }
        self.total_time_ms += time_ms;
        self.categories.insert(category);
        self.accuracy()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.answered == 0
    }

    pub(crate) fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.correct as f64 / self.answered as f64
        }
    }

    pub(crate) fn finish(&self, ending_difficulty: f64) -> SessionSummary {
        let average_response_time_ms = if self.answered == 0 {
            0.0
        } else {
            self.total_time_ms / self.answered as f64
        };

        SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            questions_answered: self.answered,
            correct_answers: self.correct,
            accuracy: self.accuracy(),
            average_response_time_ms,
            starting_difficulty: self.starting_difficulty,
            ending_difficulty,
            categories: self.categories.iter().copied().collect(),
        }
    }
}
