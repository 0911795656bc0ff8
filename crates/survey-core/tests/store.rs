use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::{Value, json};
use time::OffsetDateTime;

use survey_core::{
    AnswerMap, FixedClock, FormStateStore, MemoryBackend, Settings, StorageBackend, StoreError,
};

fn clock() -> FixedClock {
    FixedClock(OffsetDateTime::from_unix_timestamp(1_792_404_000).expect("valid timestamp"))
}

fn sample_answers() -> AnswerMap {
    let mut answers = AnswerMap::new();
    answers.set("name", "Ali Veli");
    answers.set("topics", vec!["cloud", "ai"]);
    answers
}

/// Backend whose records stay inspectable after the store takes ownership.
#[derive(Clone, Default)]
struct SharedBackend {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl StorageBackend for SharedBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

struct BrokenBackend;

impl StorageBackend for BrokenBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable(key.to_string()))
    }

    fn set(&mut self, key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(key.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(key.to_string()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[test]
fn autosave_roundtrip_in_memory() {
    let mut store = FormStateStore::new(MemoryBackend::new()).with_clock(clock());
    assert!(store.load_autosave().is_none());

    assert!(store.save_autosave(&sample_answers()));
    assert_eq!(store.load_autosave(), Some(sample_answers()));

    let mut changed = sample_answers();
    changed.set("name", "Ali");
    assert!(store.save_autosave(&changed));
    assert_eq!(store.load_autosave(), Some(changed));
}

#[test]
fn snapshots_use_persisted_shape() {
    let backend = SharedBackend::default();
    let mut store = FormStateStore::new(backend.clone()).with_clock(clock());
    store.save_autosave(&sample_answers());
    store.save_completed(&sample_answers());

    let entries = backend.entries.borrow();
    let autosave: Value =
        serde_json::from_str(&entries["survey_autosave"]).expect("autosave json");
    assert_eq!(
        autosave,
        json!({
            "data": { "name": "Ali Veli", "topics": ["cloud", "ai"] },
            "timestamp": "2026-10-19T10:00:00Z",
            "version": "1.0"
        })
    );

    let completed: Value =
        serde_json::from_str(&entries["survey_completed"]).expect("completed json");
    assert_eq!(completed["completedAt"], "2026-10-19T10:00:00Z");
    assert_eq!(completed["version"], "1.0");
    assert_eq!(completed["data"]["name"], "Ali Veli");
}

#[test]
fn completed_coexists_with_autosave_and_overwrites() {
    let mut store = FormStateStore::in_memory();
    let mut first = sample_answers();
    store.save_autosave(&first);
    store.save_completed(&first);

    first.set("name", "Second");
    store.save_completed(&first);

    assert_eq!(store.load_completed(), Some(first));
    assert_eq!(store.load_autosave(), Some(sample_answers()));
}

#[test]
fn namespace_prefixes_every_key() {
    let backend = SharedBackend::default();
    let mut store = FormStateStore::new(backend.clone()).with_namespace("intake_");
    store.save_autosave(&sample_answers());
    store.save_settings(&Settings::default());

    let keys: Vec<String> = backend.entries.borrow().keys().cloned().collect();
    assert_eq!(keys, vec!["intake_autosave", "intake_settings"]);
}

#[test]
fn broken_backend_degrades_without_error() {
    let mut store = FormStateStore::new(BrokenBackend);
    assert!(!store.save_autosave(&sample_answers()));
    assert!(!store.save_completed(&sample_answers()));
    assert!(store.load_autosave().is_none());
    assert!(store.load_completed().is_none());
    assert_eq!(store.load_settings(), Settings::default());
    assert!(!store.clear());

    let info = store.storage_info();
    assert!(!info.available);
    assert!(!info.has_autosave);
}

#[test]
fn corrupted_record_loads_as_absent() {
    let backend = SharedBackend::default();
    backend
        .entries
        .borrow_mut()
        .insert("survey_autosave".into(), "{not json".into());
    let store = FormStateStore::new(backend);
    assert!(store.load_autosave().is_none());
}

#[test]
fn settings_default_until_saved() {
    let mut store = FormStateStore::in_memory().with_clock(clock());
    let defaults = store.load_settings();
    assert_eq!(defaults.theme, "default");
    assert!(defaults.auto_save);
    assert_eq!(defaults.language, "tr");
    assert!(store.stored_settings().is_none());

    let mut settings = Settings::default();
    settings.theme = "dark".into();
    settings.extra.insert("fontScale".into(), json!(1.2));
    assert!(store.save_settings(&settings));

    let loaded = store.stored_settings().expect("settings saved");
    assert_eq!(loaded.theme, "dark");
    assert_eq!(loaded.updated_at.as_deref(), Some("2026-10-19T10:00:00Z"));
    assert_eq!(loaded.extra["fontScale"], json!(1.2));
}

#[test]
fn clear_removes_all_records() {
    let mut store = FormStateStore::in_memory();
    store.save_autosave(&sample_answers());
    store.save_completed(&sample_answers());
    store.save_settings(&Settings::default());
    let info = store.storage_info();
    assert!(info.has_autosave && info.has_completed && info.has_settings);

    assert!(store.clear());
    let info = store.storage_info();
    assert!(info.available);
    assert!(!info.has_autosave && !info.has_completed && !info.has_settings);
}
