//! Player performance tracking: answer events, bounded history and
//! per-category skill aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::question::{Category, QuestionId, ScoredQuestion};

/// Maximum number of records kept in a history.
pub const MAX_HISTORY: usize = 1000;

/// Answers needed in a category before its skill level departs from the default.
pub const MIN_SKILL_SAMPLES: u32 = 5;

/// Skill level assumed for categories without enough data.
pub const DEFAULT_SKILL: f64 = 0.5;

/// Response time at which the speed component of skill reaches zero.
const SLOWEST_RESPONSE_MS: f64 = 15_000.0;

/// A "question answered" notification from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerEvent {
    pub category: Category,
    pub is_correct: bool,
    pub response_time_ms: f64,
    /// Self-reported confidence; estimated when absent
    pub confidence: Option<f64>,
    pub question_id: Option<QuestionId>,
    /// Difficulty of the answered question, if known
    pub question_difficulty: Option<f64>,
}

impl AnswerEvent {
    pub fn new(category: Category, is_correct: bool, response_time_ms: f64) -> Self {
        Self {
            category,
            is_correct,
            response_time_ms,
            confidence: None,
            question_id: None,
            question_difficulty: None,
        }
    }

    /// Create a correct answer event.
    pub fn correct(category: Category, response_time_ms: f64) -> Self {
        Self::new(category, true, response_time_ms)
    }

    /// Create an incorrect answer event.
    pub fn incorrect(category: Category, response_time_ms: f64) -> Self {
        Self::new(category, false, response_time_ms)
    }

    /// Create an event for an answer to a specific question.
    pub fn for_question(
        question: &ScoredQuestion,
        is_correct: bool,
        response_time_ms: f64,
    ) -> Self {
        Self {
            question_id: Some(question.id()),
            question_difficulty: Some(question.difficulty),
            ..Self::new(question.category(), is_correct, response_time_ms)
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Confidence to record: supplied (clamped) or estimated.
    pub fn resolved_confidence(&self) -> f64 {
        match self.confidence {
            Some(c) if !c.is_nan() => c.clamp(0.0, 1.0),
            _ => estimate_confidence(self.is_correct, self.response_time_ms),
        }
    }
}

/// Estimate confidence from correctness and response time.
///
/// A fast wrong answer never scores above 0.3.
pub fn estimate_confidence(is_correct: bool, response_time_ms: f64) -> f64 {
    match (is_correct, response_time_ms) {
        (true, t) if t < 3000.0 => 0.9,
        (true, t) if t < 8000.0 => 0.7,
        (true, _) => 0.5,
        (false, t) if t < 3000.0 => 0.3,
        (false, t) if t < 8000.0 => 0.2,
        (false, _) => 0.1,
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub timestamp: DateTime<Utc>,
    pub question_id: Option<QuestionId>,
    pub is_correct: bool,
    pub response_time_ms: f64,
    pub confidence: f64,
    pub difficulty: f64,
    pub category: Category,
    pub session_accuracy: f64,
}

/// Bounded, oldest-first history of performance records.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceHistory {
    records: VecDeque<PerformanceRecord>,
    capacity: usize,
}

impl Default for PerformanceHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl PerformanceHistory {
    /// Create a history holding at most `capacity` records (capped at 1000).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a history from records, keeping the newest that fit.
    pub fn from_records(records: Vec<PerformanceRecord>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        let skip = records.len().saturating_sub(history.capacity);
        history.records.extend(records.into_iter().skip(skip));
        history
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&mut self, record: PerformanceRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &PerformanceRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&PerformanceRecord> {
        self.records.back()
    }

    /// The newest `n` records, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &PerformanceRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip)
    }

    /// Accuracy over the newest `n` records, `None` when empty.
    pub fn accuracy_over(&self, n: usize) -> Option<f64> {
        let (correct, total) = self
            .recent(n)
            .fold((0usize, 0usize), |(c, t), r| (c + r.is_correct as usize, t + 1));
        if total == 0 {
            None
        } else {
            Some(correct as f64 / total as f64)
        }
    }

    /// Categories of the newest `n` records.
    pub fn recent_categories(&self, n: usize) -> Vec<Category> {
        self.recent(n).map(|r| r.category).collect()
    }

    pub fn to_vec(&self) -> Vec<PerformanceRecord> {
        self.records.iter().cloned().collect()
    }
}

/// Aggregate performance in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySkill {
    pub accuracy: f64,
    pub average_time_ms: f64,
    pub questions_answered: u32,
    pub skill_level: f64,
}

impl Default for CategorySkill {
    fn default() -> Self {
        Self {
            accuracy: 0.0,
            average_time_ms: 0.0,
            questions_answered: 0,
            skill_level: DEFAULT_SKILL,
        }
    }
}

impl CategorySkill {
    /// Fold one answer into the running means.
    pub fn record(&mut self, is_correct: bool, response_time_ms: f64) {
        self.questions_answered += 1;
        let n = self.questions_answered as f64;
        let outcome = if is_correct { 1.0 } else { 0.0 };

        self.accuracy = (self.accuracy * (n - 1.0) + outcome) / n;
        self.average_time_ms = (self.average_time_ms * (n - 1.0) + response_time_ms) / n;
        self.skill_level = self.compute_skill_level();
    }

    /// Whether enough answers exist for the skill level to be meaningful.
    pub fn is_established(&self) -> bool {
        self.questions_answered >= MIN_SKILL_SAMPLES
    }

    fn compute_skill_level(&self) -> f64 {
        if !self.is_established() {
            return DEFAULT_SKILL;
        }
        let speed = (1.0 - self.average_time_ms / SLOWEST_RESPONSE_MS).clamp(0.0, 1.0);
        (0.7 * self.accuracy + 0.3 * speed).clamp(0.0, 1.0)
    }
}
