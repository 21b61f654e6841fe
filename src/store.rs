//! Persistence collaborator seam.
//!
//! The library performs no I/O itself. Hosts implement [`StatePersistence`]
//! over whatever storage they have; [`InMemoryPersistence`] keeps the JSON
//! snapshot in a key-value map.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::state::{StateImport, StateSnapshot};

/// Storage key the snapshot is written under.
pub const STATE_KEY: &str = "adaptive_difficulty_state";

/// Saves and restores estimator state across restarts.
pub trait StatePersistence {
    /// Store the latest snapshot.
    fn save(&mut self, snapshot: &StateSnapshot) -> Result<()>;

    /// Load previously stored state, `None` when nothing was saved.
    fn load(&self) -> Result<Option<StateImport>>;
}

/// Key-value persistence held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersistence {
    entries: HashMap<String, String>,
    saves: u64,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw JSON blob, as a host restoring old data would.
    pub fn with_raw(json: impl Into<String>) -> Self {
        let mut store = Self::default();
        store.entries.insert(STATE_KEY.to_string(), json.into());
        store
    }

    /// Raw stored JSON, if any.
    pub fn raw(&self) -> Option<&str> {
        self.entries.get(STATE_KEY).map(|s| s.as_str())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u64 {
        self.saves
    }
}

impl StatePersistence for InMemoryPersistence {
    fn save(&mut self, snapshot: &StateSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.entries.insert(STATE_KEY.to_string(), json);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<StateImport>> {
        match self.entries.get(STATE_KEY) {
            Some(json) => StateImport::from_json(json)
                .map(Some)
                .map_err(|e| Error::persistence(format!("stored state unreadable: {e}"))),
            None => Ok(None),
        }
    }
}
