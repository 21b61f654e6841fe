//! Static difficulty scoring for corpus questions.
//!
//! Each question gets a scalar difficulty in [0,1] from four weighted signals:
//! - Source level (40%)
//! - Text complexity (30%)
//! - Category weight (20%)
//! - Similarity between the answer options (10%)
//!
//! The similarity term is a character-overlap heuristic, not an edit distance.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::question::{Category, QuestionRecord};

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("invalid regex"));

/// Estimate the static difficulty of a question.
pub fn estimate_difficulty(question: &QuestionRecord, level: u32, category: Category) -> f64 {
    let difficulty = 0.4 * (level as f64 / 10.0)
        + 0.3 * text_complexity(&question.text)
        + 0.2 * category.weight()
        + 0.1 * answer_similarity(&question.options);

    difficulty.clamp(0.0, 1.0)
}

/// Complexity of question text from word count and mean word length.
pub fn text_complexity(text: &str) -> f64 {
    let words: Vec<&str> = WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return 0.0;
    }

    let word_count = words.len() as f64;
    let mean_word_len =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count;

    (0.6 * (word_count / 20.0) + 0.4 * (mean_word_len / 10.0)).clamp(0.0, 1.0)
}

/// Mean pairwise character overlap across all answer options.
///
/// Returns 0 with fewer than two options.
pub fn answer_similarity(options: &[String]) -> f64 {
    if options.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in options.iter().enumerate() {
        for b in &options[i + 1..] {
            total += character_overlap(a, b);
            pairs += 1;
        }
    }

    total / pairs as f64
}

/// Shared characters (case-folded, counted with multiplicity) over the
/// longer string's length.
fn character_overlap(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let longer = a.len().max(b.len());
    if longer == 0 {
        return 1.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in &a {
        *counts.entry(*c).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for c in &b {
        if let Some(n) = counts.get_mut(c) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }

    shared as f64 / longer as f64
}
