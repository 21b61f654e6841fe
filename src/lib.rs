//! # quiz-adapt
//!
//! Adaptive difficulty and question selection for a multiple-choice trivia
//! quiz. Questions get a static difficulty score, player answers drive a
//! smoothed difficulty target, and the next question is drawn from the
//! corpus around that target.
//!
//! ## Core Components
//!
//! - **Corpus**: Validated, scored questions partitioned into tiers
//! - **Estimator**: Performance history, category skills and the adaptive target
//! - **Selector**: Weighted candidate ranking with randomized top-N picking
//! - **Engine**: Facade that also persists state through a host collaborator
//!
//! ## Example
//!
//! ```rust,ignore
//! use quiz_adapt::{AdaptiveConfig, AdaptiveEngine, AnswerEvent, Corpus};
//!
//! let corpus = Corpus::from_json(bank_json)?;
//! let mut engine = AdaptiveEngine::new(corpus, AdaptiveConfig::default())?;
//!
//! if let Some(question) = engine.next_question(None, &recent).cloned() {
//!     let difficulty = engine.record_answer(AnswerEvent::for_question(&question, true, 2400.0));
//!     println!("next target: {difficulty:.2}");
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod insights;
pub mod performance;
pub mod question;
pub mod selector;
pub mod state;
pub mod store;

#[cfg(test)]
mod proptest;

// Re-exports for convenience
pub use config::{AdaptationRule, AdaptiveConfig};
pub use corpus::{Corpus, CorpusStats, QuestionBank};
pub use difficulty::{answer_similarity, estimate_difficulty, text_complexity};
pub use engine::AdaptiveEngine;
pub use error::{Error, Result};
pub use estimator::{initial_difficulty_from_history, DifficultyEstimator};
pub use insights::{Insights, SessionSummary};
pub use performance::{
    estimate_confidence, AnswerEvent, CategorySkill, PerformanceHistory, PerformanceRecord,
};
pub use question::{
    BankEntry, Category, DifficultyTier, QuestionId, QuestionRecord, ScoredQuestion,
};
pub use selector::{tier_band, CandidateScore, NoSkills, QuestionSelector, SkillSource};
pub use state::{StateImport, StateSnapshot};
pub use store::{InMemoryPersistence, StatePersistence, STATE_KEY};
