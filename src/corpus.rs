//! Question corpus: validated, scored and partitioned into difficulty tiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::difficulty::estimate_difficulty;
use crate::error::{Error, Result};
use crate::question::{BankEntry, Category, DifficultyTier, QuestionRecord, ScoredQuestion};

/// Host question bank layout: category -> level -> questions.
pub type QuestionBank = BTreeMap<Category, BTreeMap<u32, Vec<BankEntry>>>;

/// Read-only collection of scored questions with per-tier pools.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    questions: Vec<ScoredQuestion>,
    /// Indices into `questions`, one pool per tier
    tiers: BTreeMap<DifficultyTier, Vec<usize>>,
}

/// Summary counts over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    pub total: usize,
    pub by_tier: BTreeMap<DifficultyTier, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub mean_difficulty: f64,
}

impl Corpus {
    /// Validate, score and tier a host question bank.
    ///
    /// Fails on the first malformed entry.
    pub fn from_bank(bank: QuestionBank) -> Result<Self> {
        let mut questions = Vec::new();

        for (category, levels) in bank {
            for (level, entries) in levels {
                for (index, entry) in entries.into_iter().enumerate() {
                    let record = QuestionRecord::from_entry(entry, category, level);
                    if let Some(reason) = record.validation_error() {
                        return Err(Error::invalid_question(category, level, index, reason));
                    }
                    let difficulty = estimate_difficulty(&record, level, category);
                    questions.push(ScoredQuestion::new(record, difficulty));
                }
            }
        }

        let corpus = Self::from_scored(questions);
        info!(
            total = corpus.len(),
            easy = corpus.tier(DifficultyTier::Easy).len(),
            medium = corpus.tier(DifficultyTier::Medium).len(),
            hard = corpus.tier(DifficultyTier::Hard).len(),
            expert = corpus.tier(DifficultyTier::Expert).len(),
            "Loaded question corpus"
        );
        Ok(corpus)
    }

    /// Parse a question bank from JSON and load it.
    pub fn from_json(json: &str) -> Result<Self> {
        let bank: QuestionBank = serde_json::from_str(json)?;
        Self::from_bank(bank)
    }

    /// Build a corpus from questions whose difficulty is already known.
    pub fn from_scored(questions: Vec<ScoredQuestion>) -> Self {
        let mut tiers: BTreeMap<DifficultyTier, Vec<usize>> = DifficultyTier::ALL
            .iter()
            .map(|t| (*t, Vec::new()))
            .collect();

        for (i, q) in questions.iter().enumerate() {
            tiers.entry(q.tier()).or_default().push(i);
        }

        debug!(total = questions.len(), "Rebuilt tier pools");
        Self { questions, tiers }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// All questions in load order.
    pub fn questions(&self) -> &[ScoredQuestion] {
        &self.questions
    }

    /// Questions in one tier pool.
    pub fn tier(&self, tier: DifficultyTier) -> Vec<&ScoredQuestion> {
        self.tiers
            .get(&tier)
            .map(|idx| idx.iter().map(|&i| &self.questions[i]).collect())
            .unwrap_or_default()
    }

    /// Questions belonging to a category.
    pub fn by_category(&self, category: Category) -> Vec<&ScoredQuestion> {
        self.questions
            .iter()
            .filter(|q| q.category() == category)
            .collect()
    }

    /// Find a question by exact text.
    pub fn find(&self, text: &str) -> Option<&ScoredQuestion> {
        self.questions.iter().find(|q| q.text() == text)
    }

    pub fn stats(&self) -> CorpusStats {
        let mut by_category = BTreeMap::new();
        for q in &self.questions {
            *by_category.entry(q.category()).or_insert(0) += 1;
        }

        let by_tier = self
            .tiers
            .iter()
            .map(|(tier, idx)| (*tier, idx.len()))
            .collect();

        let mean_difficulty = if self.questions.is_empty() {
            0.0
        } else {
            self.questions.iter().map(|q| q.difficulty).sum::<f64>() / self.questions.len() as f64
        };

        CorpusStats {
            total: self.questions.len(),
            by_tier,
            by_category,
            mean_difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LONG_PLANET_QUESTION: &str = "Which planet has a retrograde rotation \
        and the longest solar day of any planet in the solar system?";

    fn entry(text: &str, correct_index: usize) -> BankEntry {
        BankEntry::new(
            text,
            vec!["Mercury".to_string(), "Venus".to_string(), "Mars".to_string()],
            correct_index,
            "",
        )
    }

    fn sample_bank() -> QuestionBank {
        let mut bank = QuestionBank::new();
        bank.entry(Category::Science).or_default().insert(
            1,
            vec![entry("Which planet is closest to the sun?", 0)],
        );
        bank.entry(Category::Science).or_default().insert(
            9,
            vec![entry(LONG_PLANET_QUESTION, 1)],
        );
        bank.entry(Category::Sports)
            .or_default()
            .insert(2, vec![entry("Which planet is red?", 2)]);
        bank
    }

    #[test]
    fn test_from_bank_scores_and_tiers() {
        let corpus = Corpus::from_bank(sample_bank()).unwrap();
        assert_eq!(corpus.len(), 3);

        let tiered: usize = DifficultyTier::ALL.iter().map(|t| corpus.tier(*t).len()).sum();
        assert_eq!(tiered, 3);

        for q in corpus.questions() {
            assert!((0.0..=1.0).contains(&q.difficulty));
            assert!(corpus.tier(q.tier()).iter().any(|p| p.text() == q.text()));
        }

        let easy = corpus.find("Which planet is closest to the sun?").unwrap();
        let hard = corpus.find(LONG_PLANET_QUESTION).unwrap();
        assert!(hard.difficulty > easy.difficulty);
        assert_eq!(easy.level(), 1);
        assert_eq!(hard.category(), Category::Science);
    }

    #[test]
    fn test_from_bank_rejects_bad_index() {
        let mut bank = sample_bank();
        bank.entry(Category::History)
            .or_default()
            .insert(3, vec![entry("ok", 0), entry("broken", 7)]);

        let err = Corpus::from_bank(bank).unwrap_err();
        match err {
            Error::InvalidQuestion {
                category,
                level,
                index,
                reason,
            } => {
                assert_eq!(category, Category::History);
                assert_eq!(level, 3);
                assert_eq!(index, 1);
                assert!(reason.contains("out of range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_bank_rejects_too_few_options() {
        let mut bank = QuestionBank::new();
        bank.entry(Category::General).or_default().insert(
            1,
            vec![BankEntry::new("Lonely?", vec!["yes".to_string()], 0, "")],
        );
        assert!(matches!(
            Corpus::from_bank(bank),
            Err(Error::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "history": {
                "1": [
                    {"text": "Who was the first US president?",
                     "options": ["Washington", "Lincoln"],
                     "correctIndex": 0,
                     "explanation": "George Washington, 1789."}
                ]
            },
            "literature": {
                "4": [
                    {"text": "Who wrote Dune?", "options": ["Herbert", "Asimov"], "correctIndex": 0}
                ]
            }
        }"#;

        let corpus = Corpus::from_json(json).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.by_category(Category::History).len(), 1);
        let dune = corpus.find("Who wrote Dune?").unwrap();
        assert_eq!(dune.level(), 4);
        assert_eq!(dune.record.explanation, "");
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            Corpus::from_json("{not json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_stats() {
        let corpus = Corpus::from_bank(sample_bank()).unwrap();
        let stats = corpus.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category.get(&Category::Science), Some(&2));
        assert_eq!(stats.by_category.get(&Category::Sports), Some(&1));
        assert_eq!(stats.by_tier.values().sum::<usize>(), 3);
        assert!(stats.mean_difficulty > 0.0);

        let empty = Corpus::default().stats();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.mean_difficulty, 0.0);
    }
}
