//! Property-based tests for the adaptive engine using proptest.
//!
//! These tests check the invariants that must hold for any answer stream:
//!
//! - Static difficulty scores stay in [0, 1]
//! - Current difficulty never leaves the configured bounds
//! - History never grows past its capacity
//! - Category skill tracks exact running means

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::config::{AdaptationRule, AdaptiveConfig};
    use crate::corpus::Corpus;
    use crate::difficulty::estimate_difficulty;
    use crate::estimator::DifficultyEstimator;
    use crate::performance::{AnswerEvent, CategorySkill, DEFAULT_SKILL, MIN_SKILL_SAMPLES};
    use crate::question::{Category, QuestionRecord, ScoredQuestion};
    use crate::selector::{NoSkills, QuestionSelector};

    fn category() -> impl Strategy<Value = Category> {
        prop::sample::select(Category::ALL.to_vec())
    }

    // Response times including invalid values the estimator must sanitize
    fn response_time() -> impl Strategy<Value = f64> {
        prop_oneof![
            Just(0.0),
            Just(-50.0),
            Just(f64::NAN),
            100.0f64..30_000.0f64,
        ]
    }

    fn answer() -> impl Strategy<Value = AnswerEvent> {
        (category(), any::<bool>(), response_time())
            .prop_map(|(category, correct, time)| AnswerEvent::new(category, correct, time))
    }

    fn rule() -> impl Strategy<Value = AdaptationRule> {
        prop_oneof![Just(AdaptationRule::Smoothed), Just(AdaptationRule::Literal)]
    }

    fn record(
        text: String,
        options: Vec<String>,
        category: Category,
        level: u32,
    ) -> QuestionRecord {
        QuestionRecord {
            text,
            options,
            correct_index: 0,
            explanation: String::new(),
            category,
            source_level: level,
        }
    }

    // =========================================================================
    // Static Scoring
    // =========================================================================

    proptest! {
        #[test]
        fn static_difficulty_is_bounded(
            text in "[a-zA-Z ?]{0,200}",
            options in prop::collection::vec("[a-z ]{0,20}", 0..6),
            level in 0u32..40,
            category in category()
        ) {
            let question = record(text, options, category, level);
            let d = estimate_difficulty(&question, level, category);
            prop_assert!((0.0..=1.0).contains(&d), "difficulty {} out of range", d);
        }
    }

    // =========================================================================
    // Estimator Invariants
    // =========================================================================

    proptest! {
        #[test]
        fn difficulty_stays_within_bounds(
            answers in prop::collection::vec(answer(), 1..120),
            rule in rule(),
            min in 0.0f64..0.5,
            span in 0.1f64..0.5
        ) {
            let config = AdaptiveConfig::default()
                .with_bounds(min, min + span)
                .with_rule(rule);
            let mut estimator = DifficultyEstimator::new(config).unwrap();

            for event in answers {
                let d = estimator.record_answer(event);
                prop_assert!(d >= min - 1e-12 && d <= min + span + 1e-12,
                    "difficulty {} outside [{}, {}]", d, min, min + span);
                prop_assert!(d.is_finite());
            }
        }

        #[test]
        fn history_respects_capacity(
            answers in prop::collection::vec(answer(), 0..80),
            capacity in 1usize..40
        ) {
            let config = AdaptiveConfig::default().with_history_capacity(capacity);
            let mut estimator = DifficultyEstimator::new(config).unwrap();
            let total = answers.len();

            for event in answers {
                estimator.record_answer(event);
                prop_assert!(estimator.history().len() <= capacity);
            }
            prop_assert_eq!(estimator.history().len(), total.min(capacity));
        }

        #[test]
        fn export_import_preserves_difficulty(
            answers in prop::collection::vec(answer(), 0..40)
        ) {
            let mut source = DifficultyEstimator::default();
            for event in answers {
                source.record_answer(event);
            }

            let mut target = DifficultyEstimator::default();
            target.import_state(source.export_state().into());
            prop_assert_eq!(target.current_difficulty(), source.current_difficulty());
            prop_assert_eq!(target.history().len(), source.history().len());
            prop_assert_eq!(target.skills(), source.skills());
        }
    }

    // =========================================================================
    // Category Skill
    // =========================================================================

    proptest! {
        #[test]
        fn skill_tracks_running_means(
            outcomes in prop::collection::vec((any::<bool>(), 100.0f64..20_000.0), 1..60)
        ) {
            let mut skill = CategorySkill::default();
            for &(correct, time) in &outcomes {
                skill.record(correct, time);
            }

            let n = outcomes.len() as f64;
            let accuracy = outcomes.iter().filter(|(c, _)| *c).count() as f64 / n;
            let mean_time = outcomes.iter().map(|(_, t)| t).sum::<f64>() / n;

            prop_assert!((skill.accuracy - accuracy).abs() < 1e-9);
            prop_assert!((skill.average_time_ms - mean_time).abs() < 1e-6);
            prop_assert_eq!(skill.questions_answered as usize, outcomes.len());
            prop_assert!((0.0..=1.0).contains(&skill.skill_level));
        }

        #[test]
        fn skill_is_default_until_established(
            outcomes in prop::collection::vec(
                (any::<bool>(), 100.0f64..20_000.0),
                0..MIN_SKILL_SAMPLES as usize,
            )
        ) {
            let mut skill = CategorySkill::default();
            for (correct, time) in outcomes {
                skill.record(correct, time);
            }
            prop_assert_eq!(skill.skill_level, DEFAULT_SKILL);
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    proptest! {
        #[test]
        fn selection_never_fails_on_non_empty_corpus(
            difficulties in prop::collection::vec(0.0f64..=1.0, 1..30),
            current in 0.0f64..=1.0,
            category in prop::option::of(category()),
            seed in any::<u64>()
        ) {
            let questions: Vec<ScoredQuestion> = difficulties
                .iter()
                .enumerate()
                .map(|(i, &d)| {
                    let options = vec!["a".into(), "b".into()];
                    let q = record(format!("question {i}"), options, Category::General, 1);
                    ScoredQuestion::new(q, d)
                })
                .collect();
            let corpus = Corpus::from_scored(questions);
            let recent = vec!["question 0".to_string()];

            let mut selector = QuestionSelector::with_seed(seed);
            let picked = selector.select_next(&corpus, &NoSkills, current, category, &recent);
            prop_assert!(picked.is_some());
        }
    }
}
