//! Settings for the difficulty estimator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::performance::MAX_HISTORY;

/// How an adjustment is smoothed before it moves the difficulty target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationRule {
    /// Exponential smoothing of the adjustment itself. Accuracy above target
    /// raises difficulty; slow answers lower it.
    #[default]
    Smoothed,
    /// Compatibility rule for older saved profiles. The adjustment is negated
    /// accuracy error and is blended with the absolute current difficulty.
    Literal,
}

/// Estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveConfig {
    /// Accuracy the estimator steers the player towards
    pub target_accuracy: f64,
    /// Scale of accuracy and time adjustments
    pub adaptation_aggressiveness: f64,
    /// Weight of the previous value when smoothing
    pub smoothing_factor: f64,
    /// Step size applied to the smoothed adjustment
    pub learning_rate: f64,
    /// Lower bound of the difficulty target
    pub min_difficulty: f64,
    /// Upper bound of the difficulty target
    pub max_difficulty: f64,
    /// Number of recent answers considered per update
    pub performance_window: usize,
    /// Maximum history length
    pub history_capacity: usize,
    pub rule: AdaptationRule,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            target_accuracy: 0.75,
            adaptation_aggressiveness: 0.5,
            smoothing_factor: 0.8,
            learning_rate: 0.1,
            min_difficulty: 0.2,
            max_difficulty: 0.9,
            performance_window: 10,
            history_capacity: MAX_HISTORY,
            rule: AdaptationRule::default(),
        }
    }
}

impl AdaptiveConfig {
    /// Slow-moving settings for younger or casual players.
    pub fn gentle() -> Self {
        Self {
            target_accuracy: 0.8,
            adaptation_aggressiveness: 0.3,
            smoothing_factor: 0.9,
            learning_rate: 0.05,
            min_difficulty: 0.1,
            max_difficulty: 0.7,
            ..Self::default()
        }
    }

    /// Fast-moving settings for competitive play.
    pub fn aggressive() -> Self {
        Self {
            target_accuracy: 0.7,
            adaptation_aggressiveness: 1.0,
            smoothing_factor: 0.6,
            learning_rate: 0.2,
            min_difficulty: 0.3,
            max_difficulty: 1.0,
            ..Self::default()
        }
    }

    pub fn with_target_accuracy(mut self, target: f64) -> Self {
        self.target_accuracy = target;
        self
    }

    pub fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.adaptation_aggressiveness = aggressiveness;
        self
    }

    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing_factor = smoothing;
        self
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_difficulty = min;
        self.max_difficulty = max;
        self
    }

    pub fn with_rule(mut self, rule: AdaptationRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Clamp a difficulty into the configured bounds.
    pub fn clamp(&self, difficulty: f64) -> f64 {
        difficulty.clamp(self.min_difficulty, self.max_difficulty)
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64| -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::config(format!("{name} must be in [0, 1], got {v}")))
            }
        };

        unit("targetAccuracy", self.target_accuracy)?;
        unit("smoothingFactor", self.smoothing_factor)?;
        unit("minDifficulty", self.min_difficulty)?;
        unit("maxDifficulty", self.max_difficulty)?;

        if self.min_difficulty > self.max_difficulty {
            return Err(Error::config(format!(
                "minDifficulty {} exceeds maxDifficulty {}",
                self.min_difficulty, self.max_difficulty
            )));
        }
        if !self.adaptation_aggressiveness.is_finite() || self.adaptation_aggressiveness < 0.0 {
            return Err(Error::config(
                "adaptationAggressiveness must be finite and non-negative",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::config("learningRate must be finite and positive"));
        }
        if self.performance_window == 0 {
            return Err(Error::config("performanceWindow must be at least 1"));
        }
        if self.history_capacity == 0 || self.history_capacity > MAX_HISTORY {
            return Err(Error::config(format!(
                "historyCapacity must be in [1, {MAX_HISTORY}], got {}",
                self.history_capacity
            )));
        }
        Ok(())
    }
}
