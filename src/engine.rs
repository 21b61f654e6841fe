//! Engine facade tying corpus, estimator, selector and persistence together.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, instrument, warn};

use crate::config::AdaptiveConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::estimator::DifficultyEstimator;
use crate::insights::{Insights, SessionSummary};
use crate::performance::AnswerEvent;
use crate::question::{Category, ScoredQuestion};
use crate::selector::QuestionSelector;
use crate::state::{StateImport, StateSnapshot};
use crate::store::StatePersistence;

/// Host-owned adaptive quiz engine.
///
/// All calls are synchronous; an answer is fully folded in before the next
/// selection can observe it.
pub struct AdaptiveEngine<R: Rng = StdRng> {
    corpus: Corpus,
    estimator: DifficultyEstimator,
    selector: QuestionSelector<R>,
    persistence: Option<Box<dyn StatePersistence>>,
}

impl AdaptiveEngine<StdRng> {
    /// Create an engine with fresh player state.
    pub fn new(corpus: Corpus, config: AdaptiveConfig) -> Result<Self> {
        Ok(Self::from_parts(
            corpus,
            DifficultyEstimator::new(config)?,
            QuestionSelector::new(),
        ))
    }
}

impl<R: Rng> AdaptiveEngine<R> {
    pub fn from_parts(
        corpus: Corpus,
        estimator: DifficultyEstimator,
        selector: QuestionSelector<R>,
    ) -> Self {
        Self {
            corpus,
            estimator,
            selector,
            persistence: None,
        }
    }

    /// Attach a persistence collaborator, saved to after every state change.
    pub fn with_persistence(mut self, persistence: Box<dyn StatePersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn estimator(&self) -> &DifficultyEstimator {
        &self.estimator
    }

    pub fn current_difficulty(&self) -> f64 {
        self.estimator.current_difficulty()
    }

    /// Pull stored state from the persistence collaborator.
    ///
    /// Returns whether any state was applied. Load failures leave the
    /// defaults in place.
    #[instrument(skip(self))]
    pub fn restore(&mut self) -> bool {
        let Some(persistence) = self.persistence.as_ref() else {
            return false;
        };

        match persistence.load() {
            Ok(Some(state)) => {
                self.estimator.import_state(state);
                info!(
                    current_difficulty = self.estimator.current_difficulty(),
                    "Restored adaptive state"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to restore adaptive state, using defaults");
                false
            }
        }
    }

    /// Handle a "question answered" notification.
    #[instrument(skip(self, event), fields(category = %event.category, correct = event.is_correct))]
    pub fn record_answer(&mut self, event: AnswerEvent) -> f64 {
        let difficulty = self.estimator.record_answer(event);
        self.persist();
        difficulty
    }

    /// Pick the next question for the current difficulty target.
    #[instrument(skip(self, recent_questions))]
    pub fn next_question<S: AsRef<str>>(
        &mut self,
        category: Option<Category>,
        recent_questions: &[S],
    ) -> Option<&ScoredQuestion> {
        let current = self.estimator.current_difficulty();
        self.selector.select_next(
            &self.corpus,
            &self.estimator,
            current,
            category,
            recent_questions,
        )
    }

    pub fn insights(&self) -> Insights {
        self.estimator.insights()
    }

    /// Handle a "session ended" notification.
    pub fn end_session(&mut self) -> SessionSummary {
        self.estimator.end_session()
    }

    pub fn export_state(&self) -> StateSnapshot {
        self.estimator.export_state()
    }

    pub fn import_state(&mut self, state: StateImport) {
        self.estimator.import_state(state);
        self.persist();
    }

    fn persist(&mut self) {
        if let Some(persistence) = self.persistence.as_mut() {
            if let Err(e) = persistence.save(&self.estimator.export_state()) {
                warn!(error = %e, "Failed to persist adaptive state");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::QuestionBank;
    use crate::error::Error;
    use crate::question::BankEntry;
    use crate::store::InMemoryPersistence;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn bank() -> QuestionBank {
        let mut bank = QuestionBank::new();
        for (category, prefix) in [
            (Category::Science, "Which element"),
            (Category::History, "In which year"),
            (Category::Sports, "Which team"),
        ] {
            for level in 1..=8 {
                let entries = (0..3)
                    .map(|i| {
                        let padding = " with more words".repeat(level as usize);
                        BankEntry::new(
                            format!("{prefix} question {level}-{i}{padding}"),
                            vec![
                                format!("option a{i}"),
                                format!("option b{i}"),
                                format!("choice c{i}"),
                            ],
                            i % 3,
                            "",
                        )
                    })
                    .collect();
                bank.entry(category).or_default().insert(level, entries);
            }
        }
        bank
    }

    fn engine(seed: u64) -> AdaptiveEngine {
        AdaptiveEngine::from_parts(
            Corpus::from_bank(bank()).unwrap(),
            DifficultyEstimator::default(),
            QuestionSelector::with_seed(seed),
        )
    }

    /// Shares saved snapshots with the test after the engine takes ownership.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<InMemoryPersistence>>);

    impl StatePersistence for SharedStore {
        fn save(&mut self, snapshot: &StateSnapshot) -> Result<()> {
            self.0.borrow_mut().save(snapshot)
        }

        fn load(&self) -> Result<Option<StateImport>> {
            self.0.borrow().load()
        }
    }

    struct BrokenStore;

    impl StatePersistence for BrokenStore {
        fn save(&mut self, _snapshot: &StateSnapshot) -> Result<()> {
            Err(Error::persistence("disk full"))
        }

        fn load(&self) -> Result<Option<StateImport>> {
            Err(Error::persistence("unreadable"))
        }
    }

    #[test]
    fn test_quiz_loop() {
        let mut engine = engine(9);
        let mut recent: Vec<String> = Vec::new();

        for round in 0..20 {
            let question = engine
                .next_question(Some(Category::Science), &recent)
                .cloned()
                .unwrap();
            assert!(!recent.contains(&question.text().to_string()), "round {round}");
            assert_eq!(question.category(), Category::Science);

            engine.record_answer(AnswerEvent::for_question(&question, true, 2000.0));
            recent.push(question.text().to_string());
            if recent.len() > 5 {
                recent.remove(0);
            }
        }

        assert!(engine.current_difficulty() > 0.5);
        assert_eq!(engine.estimator().history().len(), 20);
        let summary = engine.end_session();
        assert_eq!(summary.questions_answered, 20);
        assert_eq!(summary.accuracy, 1.0);
    }

    #[test]
    fn test_persists_after_each_answer() {
        let store = SharedStore::default();
        let mut engine = engine(1).with_persistence(Box::new(store.clone()));

        engine.record_answer(AnswerEvent::correct(Category::History, 2000.0));
        engine.record_answer(AnswerEvent::incorrect(Category::History, 9000.0));
        assert_eq!(store.0.borrow().save_count(), 2);

        let mut restored = self::engine(2).with_persistence(Box::new(store.clone()));
        assert!(restored.restore());
        assert!((restored.current_difficulty() - engine.current_difficulty()).abs() < 1e-12);
        assert_eq!(restored.estimator().history().len(), 2);
    }

    #[test]
    fn test_restore_without_saved_state() {
        let mut engine = engine(1).with_persistence(Box::new(InMemoryPersistence::new()));
        assert!(!engine.restore());
        assert_eq!(engine.current_difficulty(), 0.5);

        let mut bare = self::engine(1);
        assert!(!bare.restore());
    }

    #[test]
    fn test_persistence_failures_are_tolerated() {
        let mut engine = engine(4).with_persistence(Box::new(BrokenStore));
        assert!(!engine.restore());
        let d = engine.record_answer(AnswerEvent::correct(Category::Sports, 1000.0));
        assert!(d > 0.5);
        assert!(engine.next_question(None, &[] as &[&str]).is_some());
    }

    #[test]
    fn test_import_then_export() {
        let mut engine = engine(3);
        engine.import_state(StateImport::difficulty(0.77));
        assert_eq!(engine.export_state().current_difficulty, 0.77);
        assert_eq!(engine.insights().current_difficulty, 0.77);
    }

    #[test]
    fn test_new_validates_config() {
        let corpus = Corpus::from_bank(bank()).unwrap();
        assert!(AdaptiveEngine::new(corpus.clone(), AdaptiveConfig::default()).is_ok());
        let invalid = AdaptiveConfig::default().with_learning_rate(-1.0);
        assert!(AdaptiveEngine::new(corpus, invalid).is_err());
    }
}
