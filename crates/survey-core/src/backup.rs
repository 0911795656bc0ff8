use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use tracing::{debug, error};

use crate::answers::AnswerMap;
use crate::clock::iso_date;
use crate::store::{FormStateStore, Settings};

/// Portable copy of everything the state store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub auto_save: Option<AnswerMap>,
    #[serde(default)]
    pub completed: Option<AnswerMap>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

/// Which records an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub auto_save: bool,
    pub completed: bool,
    pub settings: bool,
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("failed to encode backup: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to persist '{0}' record from backup")]
    Persist(&'static str),
}

/// Snapshot of the store as a [`BackupDocument`].
pub fn collect_backup(store: &FormStateStore) -> BackupDocument {
    BackupDocument {
        auto_save: store.load_autosave(),
        completed: store.load_completed(),
        settings: Some(store.load_settings()),
        exported_at: Some(store.clock().timestamp()),
    }
}

/// Serializes the store contents as pretty JSON.
pub fn export_backup(store: &FormStateStore) -> Result<String, BackupError> {
    let document = collect_backup(store);
    serde_json::to_string_pretty(&document).map_err(BackupError::Encode)
}

/// Applies a backup produced by [`export_backup`].
///
/// The whole payload is parsed and type-checked before anything is written,
/// so malformed input leaves the store untouched.
pub fn import_backup(store: &mut FormStateStore, raw: &str) -> Result<BackupSummary, BackupError> {
    let document: BackupDocument = serde_json::from_str(raw).map_err(|err| {
        error!(error = %err, "rejected malformed backup");
        BackupError::Malformed(err)
    })?;
    apply_backup(store, &document)
}

/// Writes every record present in `document`.
///
/// When a later record fails to persist, the records already written are put
/// back to their previous contents before the error is returned.
pub fn apply_backup(
    store: &mut FormStateStore,
    document: &BackupDocument,
) -> Result<BackupSummary, BackupError> {
    let mut summary = BackupSummary::default();
    let mut undo = Vec::new();

    if let Err(err) = write_records(store, document, &mut summary, &mut undo) {
        let mut rolled_back = true;
        for (key, raw) in undo.into_iter().rev() {
            rolled_back &= store.restore_raw(&key, raw);
        }
        error!(error = %err, rolled_back, "backup import failed");
        return Err(err);
    }

    debug!(?summary, "imported survey backup");
    Ok(summary)
}

fn write_records(
    store: &mut FormStateStore,
    document: &BackupDocument,
    summary: &mut BackupSummary,
    undo: &mut Vec<(String, Option<String>)>,
) -> Result<(), BackupError> {
    if let Some(answers) = &document.auto_save {
        undo.push(store.raw_entry(store.autosave_key()));
        if !store.save_autosave(answers) {
            return Err(BackupError::Persist("autosave"));
        }
        summary.auto_save = true;
    }
    if let Some(answers) = &document.completed {
        undo.push(store.raw_entry(store.completed_key()));
        if !store.save_completed(answers) {
            return Err(BackupError::Persist("completed"));
        }
        summary.completed = true;
    }
    if let Some(settings) = &document.settings {
        undo.push(store.raw_entry(store.settings_key()));
        if !store.save_settings(settings) {
            return Err(BackupError::Persist("settings"));
        }
        summary.settings = true;
    }
    Ok(())
}

pub fn backup_file_name(date: Date) -> String {
    format!("survey_backup_{}.json", iso_date(date))
}
