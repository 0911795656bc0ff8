use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::answers::AnswerMap;
use crate::clock::{Clock, SystemClock};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";
/// Default key prefix shared by all persisted records.
pub const DEFAULT_NAMESPACE: &str = "survey_";

const AUTOSAVE: &str = "autosave";
const COMPLETED: &str = "completed";
const SETTINGS: &str = "settings";

/// Errors raised by storage backends and snapshot encoding.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("i/o error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("stored record '{key}' is not valid JSON: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode record '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed string storage the state store writes through.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Process-memory backend; contents end with the session.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Continuously overwritten snapshot of in-progress answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveSnapshot {
    pub data: AnswerMap,
    pub timestamp: String,
    pub version: String,
}

/// Snapshot written once per successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSnapshot {
    pub data: AnswerMap,
    pub completed_at: String,
    pub version: String,
}

/// User preferences persisted next to the snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub auto_save: bool,
    #[serde(default = "default_true")]
    pub notifications: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Keys this version does not know about, kept for round-trips.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            auto_save: true,
            notifications: true,
            language: default_language(),
            updated_at: None,
            extra: BTreeMap::new(),
        }
    }
}

fn default_theme() -> String {
    "default".into()
}

fn default_language() -> String {
    "tr".into()
}

fn default_true() -> bool {
    true
}

/// Presence summary of the persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub available: bool,
    pub has_autosave: bool,
    pub has_completed: bool,
    pub has_settings: bool,
}

/// Persistence of autosave, completed and settings records over an injected backend.
///
/// Failures never escape the public save/load surface: they are logged and
/// reported as `false` or `None`, so losing an autosave never blocks the form.
pub struct FormStateStore {
    backend: Box<dyn StorageBackend>,
    namespace: String,
    clock: Box<dyn Clock>,
}

impl FormStateStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            namespace: DEFAULT_NAMESPACE.to_string(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn autosave_key(&self) -> String {
        format!("{}{AUTOSAVE}", self.namespace)
    }

    pub fn completed_key(&self) -> String {
        format!("{}{COMPLETED}", self.namespace)
    }

    pub fn settings_key(&self) -> String {
        format!("{}{SETTINGS}", self.namespace)
    }

    pub fn save_autosave(&mut self, answers: &AnswerMap) -> bool {
        let snapshot = AutosaveSnapshot {
            data: answers.clone(),
            timestamp: self.clock.timestamp(),
            version: SNAPSHOT_VERSION.to_string(),
        };
        let key = self.autosave_key();
        degrade(self.write(&key, &snapshot), "autosave").is_some()
    }

    pub fn autosave_snapshot(&self) -> Option<AutosaveSnapshot> {
        degrade(self.read(&self.autosave_key()), "autosave load").flatten()
    }

    pub fn load_autosave(&self) -> Option<AnswerMap> {
        self.autosave_snapshot().map(|snapshot| snapshot.data)
    }

    /// Writes the completed snapshot, replacing any earlier one.
    pub fn save_completed(&mut self, answers: &AnswerMap) -> bool {
        let snapshot = CompletedSnapshot {
            data: answers.clone(),
            completed_at: self.clock.timestamp(),
            version: SNAPSHOT_VERSION.to_string(),
        };
        let key = self.completed_key();
        degrade(self.write(&key, &snapshot), "completed save").is_some()
    }

    pub fn completed_snapshot(&self) -> Option<CompletedSnapshot> {
        degrade(self.read(&self.completed_key()), "completed load").flatten()
    }

    pub fn load_completed(&self) -> Option<AnswerMap> {
        self.completed_snapshot().map(|snapshot| snapshot.data)
    }

    pub fn save_settings(&mut self, settings: &Settings) -> bool {
        let mut stamped = settings.clone();
        stamped.updated_at = Some(self.clock.timestamp());
        let key = self.settings_key();
        degrade(self.write(&key, &stamped), "settings save").is_some()
    }

    /// Stored settings, if a record exists and parses.
    pub fn stored_settings(&self) -> Option<Settings> {
        degrade(self.read(&self.settings_key()), "settings load").flatten()
    }

    /// Stored settings, falling back to defaults.
    pub fn load_settings(&self) -> Settings {
        self.stored_settings().unwrap_or_default()
    }

    /// Removes every record under the namespace.
    pub fn clear(&mut self) -> bool {
        let keys = [self.autosave_key(), self.completed_key(), self.settings_key()];
        let mut cleared = true;
        for key in keys {
            if degrade(self.backend.remove(&key), "clear").is_none() {
                cleared = false;
            }
        }
        debug!(namespace = %self.namespace, cleared, "cleared survey storage");
        cleared
    }

    pub fn storage_info(&self) -> StorageInfo {
        StorageInfo {
            available: self.backend.is_available(),
            has_autosave: self.load_autosave().is_some(),
            has_completed: self.load_completed().is_some(),
            has_settings: self.stored_settings().is_some(),
        }
    }

    /// Raw record under `key`, kept so a partial import can be undone.
    pub(crate) fn raw_entry(&self, key: String) -> (String, Option<String>) {
        let raw = degrade(self.backend.get(&key), "record snapshot").flatten();
        (key, raw)
    }

    /// Puts back a record captured by [`Self::raw_entry`]; `None` removes it.
    pub(crate) fn restore_raw(&mut self, key: &str, raw: Option<String>) -> bool {
        let result = match raw {
            Some(raw) => self.backend.set(key, raw),
            None => self.backend.remove(key),
        };
        degrade(result, "record restore").is_some()
    }

    fn write<T: Serialize>(&mut self, key: &str, record: &T) -> Result<(), StoreError> {
        if !self.backend.is_available() {
            return Err(StoreError::Unavailable(key.to_string()));
        }
        let raw = serde_json::to_string(record).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, raw)?;
        debug!(key, "stored survey record");
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        if !self.backend.is_available() {
            return Err(StoreError::Unavailable(key.to_string()));
        }
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                key: key.to_string(),
                source,
            })
    }
}

fn degrade<T>(result: Result<T, StoreError>, operation: &'static str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(operation, error = %err, "survey storage operation failed; continuing");
            None
        }
    }
}
