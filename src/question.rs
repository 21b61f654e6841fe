//! Question content types: categories, records, scored views and tiers.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Trivia category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Science,
    History,
    Sports,
    Literature,
    General,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::Science,
        Category::History,
        Category::Sports,
        Category::Literature,
        Category::General,
    ];

    /// Fixed weight of the category in static difficulty scoring.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Science => 0.8,
            Category::History => 0.7,
            Category::Literature => 0.7,
            Category::General => 0.5,
            Category::Sports => 0.4,
        }
    }

    /// Lowercase name, as used in serialized state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Science => "science",
            Category::History => "history",
            Category::Sports => "sports",
            Category::Literature => "literature",
            Category::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content-based question identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl QuestionId {
    /// Derive an id from question text.
    pub fn from_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();
        let hex = format!("{:x}", hash);
        QuestionId(hex[..16].to_string())
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the host's question bank, before category/level are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankEntry {
    /// Question text shown to the player
    pub text: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_index: usize,
    /// Explanation shown after answering
    #[serde(default)]
    pub explanation: String,
}

impl BankEntry {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            correct_index,
            explanation: explanation.into(),
        }
    }
}

/// Immutable question content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub category: Category,
    pub source_level: u32,
}

impl QuestionRecord {
    /// Attach category and level to a bank entry.
    pub fn from_entry(entry: BankEntry, category: Category, source_level: u32) -> Self {
        Self {
            text: entry.text,
            options: entry.options,
            correct_index: entry.correct_index,
            explanation: entry.explanation,
            category,
            source_level,
        }
    }

    /// Check the record's structural invariants.
    ///
    /// Returns a description of the first problem found.
    pub fn validation_error(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            return Some("question text is empty".to_string());
        }
        if self.options.len() < 2 {
            return Some(format!(
                "needs at least 2 options, found {}",
                self.options.len()
            ));
        }
        if self.correct_index >= self.options.len() {
            return Some(format!(
                "correct index {} out of range for {} options",
                self.correct_index,
                self.options.len()
            ));
        }
        if self.source_level == 0 {
            return Some("source level must be at least 1".to_string());
        }
        None
    }

    /// Whether the given option index is the correct answer.
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }

    /// Text of the correct option.
    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Content-based id of this question.
    pub fn id(&self) -> QuestionId {
        QuestionId::from_text(&self.text)
    }
}

/// Named difficulty band of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
        DifficultyTier::Expert,
    ];

    /// Tier containing a question of the given difficulty.
    pub fn from_difficulty(difficulty: f64) -> Self {
        if difficulty < 0.3 {
            DifficultyTier::Easy
        } else if difficulty < 0.6 {
            DifficultyTier::Medium
        } else if difficulty < 0.8 {
            DifficultyTier::Hard
        } else {
            DifficultyTier::Expert
        }
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifficultyTier::Easy => write!(f, "easy"),
            DifficultyTier::Medium => write!(f, "medium"),
            DifficultyTier::Hard => write!(f, "hard"),
            DifficultyTier::Expert => write!(f, "expert"),
        }
    }
}

/// A question with its derived difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredQuestion {
    #[serde(flatten)]
    pub record: QuestionRecord,
    pub difficulty: f64,
}

impl ScoredQuestion {
    /// Wrap a record with a precomputed difficulty, clamped to [0,1].
    pub fn new(record: QuestionRecord, difficulty: f64) -> Self {
        let difficulty = if difficulty.is_nan() {
            0.0
        } else {
            difficulty.clamp(0.0, 1.0)
        };
        Self { record, difficulty }
    }

    pub fn text(&self) -> &str {
        &self.record.text
    }

    pub fn category(&self) -> Category {
        self.record.category
    }

    pub fn level(&self) -> u32 {
        self.record.source_level
    }

    pub fn tier(&self) -> DifficultyTier {
        DifficultyTier::from_difficulty(self.difficulty)
    }

    pub fn id(&self) -> QuestionId {
        self.record.id()
    }
}
