//! Next-question selection.
//!
//! Selection runs in stages:
//! 1. Map the difficulty target to a band of tier pools (bands overlap so
//!    pools stay non-empty near tier boundaries)
//! 2. Filter by category and drop recently asked questions
//! 3. Score the remaining candidates and pick one of the top three at random
//!
//! When filtering leaves nothing, any question from the whole corpus is
//! returned instead. `None` means the corpus itself is empty.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::corpus::Corpus;
use crate::performance::DEFAULT_SKILL;
use crate::question::{Category, DifficultyTier, ScoredQuestion};

/// Number of top-ranked candidates the final pick is drawn from.
pub const TOP_CANDIDATES: usize = 3;

/// Number of recent answers considered for category novelty.
pub const NOVELTY_WINDOW: usize = 5;

/// Player data the selector reads.
pub trait SkillSource {
    /// Skill level in a category; 0.5 when unknown.
    fn category_skill(&self, category: Category) -> f64;

    /// Categories of the newest `n` answers.
    fn recent_categories(&self, n: usize) -> Vec<Category>;
}

/// Skill source for a player with no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSkills;

impl SkillSource for NoSkills {
    fn category_skill(&self, _category: Category) -> f64 {
        DEFAULT_SKILL
    }

    fn recent_categories(&self, _n: usize) -> Vec<Category> {
        Vec::new()
    }
}

/// Tier pools searched for a difficulty target.
pub fn tier_band(current_difficulty: f64) -> &'static [DifficultyTier] {
    if current_difficulty < 0.25 {
        &[DifficultyTier::Easy]
    } else if current_difficulty < 0.5 {
        &[DifficultyTier::Easy, DifficultyTier::Medium]
    } else if current_difficulty < 0.75 {
        &[DifficultyTier::Medium, DifficultyTier::Hard]
    } else {
        &[DifficultyTier::Hard, DifficultyTier::Expert]
    }
}

/// A candidate with its score breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateScore<'a> {
    pub question: &'a ScoredQuestion,
    pub score: f64,
    /// 1 - |question difficulty - target|
    pub difficulty_match: f64,
    pub skill: f64,
    pub novelty: f64,
    /// Preference for categories the player still has to learn
    pub learning_objective: f64,
}

impl<'a> CandidateScore<'a> {
    fn compute(
        question: &'a ScoredQuestion,
        current_difficulty: f64,
        skills: &impl SkillSource,
        recent: &[Category],
    ) -> Self {
        let difficulty_match = 1.0 - (question.difficulty - current_difficulty).abs();
        let skill = skills.category_skill(question.category());
        let occurrences = recent.iter().filter(|c| **c == question.category()).count();
        let novelty = 1.0 - occurrences as f64 / NOVELTY_WINDOW as f64;
        let learning_objective = 1.0 - skill;

        let score =
            0.4 * difficulty_match + 0.3 * skill + 0.2 * novelty + 0.1 * learning_objective;

        Self {
            question,
            score,
            difficulty_match,
            skill,
            novelty,
            learning_objective,
        }
    }
}

/// Picks the next question with bounded randomness.
#[derive(Debug, Clone)]
pub struct QuestionSelector<R: Rng = StdRng> {
    rng: R,
}

impl QuestionSelector<StdRng> {
    /// Create a selector seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic selector.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for QuestionSelector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> QuestionSelector<R> {
    /// Create a selector drawing from the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Candidates matching the target, category and recency filters, scored
    /// and sorted best first.
    pub fn rank_candidates<'c, S: AsRef<str>>(
        &self,
        corpus: &'c Corpus,
        skills: &impl SkillSource,
        current_difficulty: f64,
        category: Option<Category>,
        recent_questions: &[S],
    ) -> Vec<CandidateScore<'c>> {
        let excluded: HashSet<&str> = recent_questions.iter().map(|q| q.as_ref()).collect();
        let recent_categories = skills.recent_categories(NOVELTY_WINDOW);

        let mut ranked: Vec<CandidateScore<'c>> = tier_band(current_difficulty)
            .iter()
            .flat_map(|tier| corpus.tier(*tier))
            .filter(|q| category.map_or(true, |c| q.category() == c))
            .filter(|q| !excluded.contains(q.text()))
            .map(|q| CandidateScore::compute(q, current_difficulty, skills, &recent_categories))
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    /// Choose the next question.
    ///
    /// Returns `None` only for an empty corpus.
    pub fn select_next<'c, S: AsRef<str>>(
        &mut self,
        corpus: &'c Corpus,
        skills: &impl SkillSource,
        current_difficulty: f64,
        category: Option<Category>,
        recent_questions: &[S],
    ) -> Option<&'c ScoredQuestion> {
        let mut ranked =
            self.rank_candidates(corpus, skills, current_difficulty, category, recent_questions);

        if ranked.is_empty() {
            debug!(
                current_difficulty,
                ?category,
                "No candidates after filtering, falling back to full corpus"
            );
            return corpus.questions().choose(&mut self.rng);
        }

        ranked.truncate(TOP_CANDIDATES);
        let pick = ranked.choose(&mut self.rng)?;
        debug!(
            current_difficulty,
            ?category,
            question_difficulty = pick.question.difficulty,
            score = pick.score,
            "Selected next question"
        );
        Some(pick.question)
    }
}
