//! Dynamic difficulty estimation.
//!
//! The estimator owns all mutable player state: the bounded performance
//! history, the per-category skill profile and the current difficulty target.
//! Each answered question is folded in by [`DifficultyEstimator::record_answer`],
//! which appends to history, updates the category skill and then moves the
//! target towards the level where the player hits the target accuracy.
//!
//! ## Update rule
//!
//! Over the last `performance_window` answers:
//!
//! ```text
//! time_term  = ((mean_response_ms - 8000) / 8000) * 0.2 * aggressiveness
//! bonus      = 0.1 if mean_confidence > 0.8 and accuracy > 0.8
//! adjustment = (accuracy - target) * aggressiveness - time_term + bonus
//! smoothed   = adjustment * (1 - smoothing) + previous_smoothed * smoothing
//! difficulty = clamp(difficulty + smoothed * learning_rate, min, max)
//! ```
//!
//! [`AdaptationRule::Literal`] keeps the older formula, which negates the
//! accuracy term and blends with the absolute difficulty instead of the
//! previous adjustment.

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::{AdaptationRule, AdaptiveConfig};
use crate::error::Result;
use crate::insights::{Insights, SessionSummary, SessionTracker, STRONG_SKILL, WEAK_SKILL};
use crate::performance::{
    AnswerEvent, CategorySkill, PerformanceHistory, PerformanceRecord, DEFAULT_SKILL,
};
use crate::question::Category;
use crate::selector::SkillSource;
use crate::state::{StateImport, StateSnapshot};

/// Starting difficulty without usable history.
pub const INITIAL_DIFFICULTY: f64 = 0.5;

/// History length needed before the start target is derived from it.
pub const MIN_RECORDS_FOR_RECOMPUTE: usize = 10;

/// Records inspected when deriving a start target from history.
const INITIAL_LOOKBACK: usize = 20;

/// Response time treated as neutral by the time-pressure term.
const REFERENCE_RESPONSE_MS: f64 = 8000.0;

const TIME_PRESSURE_WEIGHT: f64 = 0.2;
const CONFIDENCE_BONUS: f64 = 0.1;
const CONFIDENCE_BONUS_THRESHOLD: f64 = 0.8;

/// Owner of the player's adaptive state.
#[derive(Debug, Clone)]
pub struct DifficultyEstimator {
    config: AdaptiveConfig,
    history: PerformanceHistory,
    skills: BTreeMap<Category, CategorySkill>,
    current_difficulty: f64,
    smoothed_adjustment: f64,
    session: SessionTracker,
}

impl Default for DifficultyEstimator {
    fn default() -> Self {
        Self::from_valid_config(AdaptiveConfig::default())
    }
}

impl DifficultyEstimator {
    /// Create an estimator with no prior state.
    pub fn new(config: AdaptiveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Create an estimator from a stored history without a stored target.
    ///
    /// Category skills are rebuilt from the records. With at least ten
    /// records the starting target is derived from them.
    pub fn with_history(config: AdaptiveConfig, records: Vec<PerformanceRecord>) -> Result<Self> {
        config.validate()?;
        let mut estimator = Self::from_valid_config(config);
        estimator.history =
            PerformanceHistory::from_records(records, estimator.config.history_capacity);

        for record in estimator.history.iter() {
            estimator
                .skills
                .entry(record.category)
                .or_default()
                .record(record.is_correct, record.response_time_ms);
        }

        if estimator.history.len() >= MIN_RECORDS_FOR_RECOMPUTE {
            estimator.current_difficulty =
                initial_difficulty_from_history(&estimator.history, &estimator.config);
        }
        estimator.session = SessionTracker::start(estimator.current_difficulty);

        info!(
            records = estimator.history.len(),
            current_difficulty = estimator.current_difficulty,
            "Restored estimator from history"
        );
        Ok(estimator)
    }

    fn from_valid_config(config: AdaptiveConfig) -> Self {
        let current_difficulty = config.clamp(INITIAL_DIFFICULTY);
        Self {
            history: PerformanceHistory::with_capacity(config.history_capacity),
            config,
            skills: BTreeMap::new(),
            current_difficulty,
            smoothed_adjustment: 0.0,
            session: SessionTracker::start(current_difficulty),
        }
    }

    pub fn current_difficulty(&self) -> f64 {
        self.current_difficulty
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn history(&self) -> &PerformanceHistory {
        &self.history
    }

    pub fn skills(&self) -> &BTreeMap<Category, CategorySkill> {
        &self.skills
    }

    pub fn category_skill(&self, category: Category) -> Option<&CategorySkill> {
        self.skills.get(&category)
    }

    /// Fold an answered question into the player state.
    ///
    /// Returns the new difficulty target.
    pub fn record_answer(&mut self, mut event: AnswerEvent) -> f64 {
        let response_time_ms = if event.response_time_ms.is_finite() {
            event.response_time_ms.max(0.0)
        } else {
            0.0
        };
        event.response_time_ms = response_time_ms;
        let confidence = event.resolved_confidence();
        let difficulty = event
            .question_difficulty
            .filter(|d| d.is_finite())
            .map(|d| d.clamp(0.0, 1.0))
            .unwrap_or(self.current_difficulty);
        let session_accuracy =
            self.session
                .record(event.category, event.is_correct, response_time_ms);

        self.history.push(PerformanceRecord {
            timestamp: Utc::now(),
            question_id: event.question_id,
            is_correct: event.is_correct,
            response_time_ms,
            confidence,
            difficulty,
            category: event.category,
            session_accuracy,
        });

        self.skills
            .entry(event.category)
            .or_default()
            .record(event.is_correct, response_time_ms);

        self.recompute_difficulty()
    }

    fn recompute_difficulty(&mut self) -> f64 {
        let window: Vec<&PerformanceRecord> =
            self.history.recent(self.config.performance_window).collect();
        if window.is_empty() {
            return self.current_difficulty;
        }

        let n = window.len() as f64;
        let accuracy = window.iter().filter(|r| r.is_correct).count() as f64 / n;
        let mean_response_ms = window.iter().map(|r| r.response_time_ms).sum::<f64>() / n;
        let mean_confidence = window.iter().map(|r| r.confidence).sum::<f64>() / n;

        let aggressiveness = self.config.adaptation_aggressiveness;
        let accuracy_error = accuracy - self.config.target_accuracy;
        let time_term = ((mean_response_ms - REFERENCE_RESPONSE_MS) / REFERENCE_RESPONSE_MS)
            * TIME_PRESSURE_WEIGHT
            * aggressiveness;
        let bonus = if mean_confidence > CONFIDENCE_BONUS_THRESHOLD
            && accuracy > CONFIDENCE_BONUS_THRESHOLD
        {
            CONFIDENCE_BONUS
        } else {
            0.0
        };

        let smoothing = self.config.smoothing_factor;
        let smoothed = match self.config.rule {
            AdaptationRule::Smoothed => {
                let adjustment = accuracy_error * aggressiveness - time_term + bonus;
                let smoothed =
                    adjustment * (1.0 - smoothing) + self.smoothed_adjustment * smoothing;
                self.smoothed_adjustment = smoothed;
                smoothed
            }
            AdaptationRule::Literal => {
                let adjustment = -accuracy_error * aggressiveness - time_term + bonus;
                adjustment * (1.0 - smoothing) + self.current_difficulty * smoothing
            }
        };

        let previous = self.current_difficulty;
        self.current_difficulty = self
            .config
            .clamp(previous + smoothed * self.config.learning_rate);

        debug!(
            accuracy,
            mean_response_ms,
            mean_confidence,
            smoothed,
            previous,
            current = self.current_difficulty,
            "Adapted difficulty"
        );
        self.current_difficulty
    }

    /// Skill level in a category, defaulting for unseen categories.
    pub fn skill_level(&self, category: Category) -> f64 {
        self.skills
            .get(&category)
            .map_or(DEFAULT_SKILL, |s| s.skill_level)
    }

    /// Summary of the player's standing for display.
    pub fn insights(&self) -> Insights {
        let skill_level = if self.skills.is_empty() {
            DEFAULT_SKILL
        } else {
            self.skills.values().map(|s| s.skill_level).sum::<f64>() / self.skills.len() as f64
        };

        let established = || self.skills.iter().filter(|(_, s)| s.is_established());
        let strong_categories = established()
            .filter(|(_, s)| s.skill_level >= STRONG_SKILL)
            .map(|(c, _)| *c)
            .collect();
        let weak_categories = established()
            .filter(|(_, s)| s.skill_level < WEAK_SKILL)
            .map(|(c, _)| *c)
            .collect();

        Insights {
            current_difficulty: self.current_difficulty,
            skill_level,
            strong_categories,
            weak_categories,
            recent_accuracy: self
                .history
                .accuracy_over(self.config.performance_window)
                .unwrap_or(0.0),
        }
    }

    /// Close the current session and start a new one.
    ///
    /// Player state is left untouched.
    pub fn end_session(&mut self) -> SessionSummary {
        let summary = self.session.finish(self.current_difficulty);
        self.session = SessionTracker::start(self.current_difficulty);

        info!(
            session_id = %summary.session_id,
            answered = summary.questions_answered,
            accuracy = summary.accuracy,
            ending_difficulty = summary.ending_difficulty,
            "Session ended"
        );
        summary
    }

    /// Plain-data copy of the full state for the host to persist.
    pub fn export_state(&self) -> StateSnapshot {
        StateSnapshot {
            profile: self.skills.clone(),
            history: self.history.to_vec(),
            current_difficulty: self.current_difficulty,
            settings: self.config.clone(),
            smoothed_adjustment: self.smoothed_adjustment,
        }
    }

    pub fn export_json(&self) -> Result<String> {
        self.export_state().to_json()
    }

    /// Merge a possibly partial state blob into this estimator.
    ///
    /// Only fields present in the blob override current values. Invalid
    /// settings are ignored. An imported difficulty is taken as-is, clamped
    /// to [0, 1] but not to the configured bounds, so it may sit outside the
    /// range later answers can reach until the first update pulls it back.
    pub fn import_state(&mut self, state: StateImport) {
        if let Some(settings) = state.settings {
            match settings.validate() {
                Ok(()) => self.config = settings,
                Err(e) => warn!(error = %e, "Ignoring invalid imported settings"),
            }
        }

        let history_imported = state.history.is_some();
        let records = state.history.unwrap_or_else(|| self.history.to_vec());
        self.history = PerformanceHistory::from_records(records, self.config.history_capacity);

        if let Some(profile) = state.profile {
            self.skills = profile;
        }

        if let Some(adjustment) = state.smoothed_adjustment.filter(|a| a.is_finite()) {
            self.smoothed_adjustment = adjustment;
        }

        match state.current_difficulty.filter(|d| d.is_finite()) {
            Some(difficulty) => self.current_difficulty = difficulty.clamp(0.0, 1.0),
            None if history_imported && self.history.len() >= MIN_RECORDS_FOR_RECOMPUTE => {
                self.current_difficulty =
                    initial_difficulty_from_history(&self.history, &self.config);
            }
            None => {}
        }

        if self.session.is_empty() {
            self.session = SessionTracker::start(self.current_difficulty);
        }

        debug!(
            records = self.history.len(),
            categories = self.skills.len(),
            current_difficulty = self.current_difficulty,
            "Imported estimator state"
        );
    }

    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let state = StateImport::from_json(json)?;
        self.import_state(state);
        Ok(())
    }
}

impl SkillSource for DifficultyEstimator {
    fn category_skill(&self, category: Category) -> f64 {
        self.skill_level(category)
    }

    fn recent_categories(&self, n: usize) -> Vec<Category> {
        self.history.recent_categories(n)
    }
}

/// Starting target derived from prior records.
///
/// Mean difficulty of the newest records, shifted by how far their accuracy
/// sits from the target accuracy.
pub fn initial_difficulty_from_history(
    history: &PerformanceHistory,
    config: &AdaptiveConfig,
) -> f64 {
    let recent: Vec<&PerformanceRecord> = history.recent(INITIAL_LOOKBACK).collect();
    if recent.is_empty() {
        return config.clamp(INITIAL_DIFFICULTY);
    }

    let n = recent.len() as f64;
    let mean_difficulty = recent.iter().map(|r| r.difficulty).sum::<f64>() / n;
    let accuracy = recent.iter().filter(|r| r.is_correct).count() as f64 / n;

    config.clamp(mean_difficulty + (accuracy - config.target_accuracy) * 0.5)
}
