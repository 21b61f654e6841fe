//! Exportable estimator state.
//!
//! `StateSnapshot` is the full state handed to the host for persistence.
//! `StateImport` is the tolerant counterpart used when restoring: every field
//! is optional and only the fields present override the defaults. Unreadable
//! fields, history records and profile entries are dropped with a warning
//! instead of failing the whole import.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::AdaptiveConfig;
use crate::error::Result;
use crate::performance::{CategorySkill, PerformanceRecord};
use crate::question::Category;

/// Complete estimator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Per-category skill aggregates
    pub profile: BTreeMap<Category, CategorySkill>,
    /// Performance history, oldest first
    pub history: Vec<PerformanceRecord>,
    pub current_difficulty: f64,
    pub settings: AdaptiveConfig,
    /// Carried adjustment of the smoothed adaptation rule
    #[serde(default)]
    pub smoothed_adjustment: f64,
}

impl StateSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Partial state accepted on import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateImport {
    #[serde(deserialize_with = "lenient_profile")]
    pub profile: Option<BTreeMap<Category, CategorySkill>>,
    #[serde(deserialize_with = "lenient_history")]
    pub history: Option<Vec<PerformanceRecord>>,
    #[serde(deserialize_with = "lenient")]
    pub current_difficulty: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub settings: Option<AdaptiveConfig>,
    #[serde(deserialize_with = "lenient")]
    pub smoothed_adjustment: Option<f64>,
}

impl StateImport {
    /// Import only a difficulty target.
    pub fn difficulty(current_difficulty: f64) -> Self {
        Self {
            current_difficulty: Some(current_difficulty),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether the blob carries nothing recognized.
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.history.is_none()
            && self.current_difficulty.is_none()
            && self.settings.is_none()
            && self.smoothed_adjustment.is_none()
    }
}

impl From<StateSnapshot> for StateImport {
    fn from(snapshot: StateSnapshot) -> Self {
        Self {
            profile: Some(snapshot.profile),
            history: Some(snapshot.history),
            current_difficulty: Some(snapshot.current_difficulty),
            settings: Some(snapshot.settings),
            smoothed_adjustment: Some(snapshot.smoothed_adjustment),
        }
    }
}

/// Parse a field, treating an unreadable value as absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(raw) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match serde_json::from_value(raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable imported field");
            Ok(None)
        }
    }
}

/// Parse history, keeping every record that reads cleanly.
fn lenient_history<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<PerformanceRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(entries) = lenient::<D, Vec<Value>>(deserializer)? else {
        return Ok(None);
    };

    let total = entries.len();
    let records: Vec<PerformanceRecord> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if records.len() < total {
        warn!(
            dropped = total - records.len(),
            kept = records.len(),
            "Dropped unreadable history records"
        );
    }
    Ok(Some(records))
}

/// Parse the skill profile, keeping every entry that reads cleanly.
fn lenient_profile<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<BTreeMap<Category, CategorySkill>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(entries) = lenient::<D, serde_json::Map<String, Value>>(deserializer)? else {
        return Ok(None);
    };

    let total = entries.len();
    let profile: BTreeMap<Category, CategorySkill> = entries
        .into_iter()
        .filter_map(|(key, value)| {
            let category = serde_json::from_value(Value::String(key)).ok()?;
            let skill = serde_json::from_value(value).ok()?;
            Some((category, skill))
        })
        .collect();
    if profile.len() < total {
        warn!(
            dropped = total - profile.len(),
            kept = profile.len(),
            "Dropped unreadable profile entries"
        );
    }
    Ok(Some(profile))
}
