use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use survey_core::{StorageInfo, backup_file_name, export_backup, import_backup};

use crate::cmd::Session;

#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    /// Backup file to write; defaults to `survey_backup_<date>.json` in the output directory
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RestoreArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long = "auto-save", value_name = "BOOL")]
    pub auto_save: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub notifications: Option<bool>,
}

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    namespace: &'a str,
    storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    output_dir: String,
    #[serde(flatten)]
    records: StorageInfo,
}

pub fn backup(args: BackupArgs, session: &Session) -> Result<()> {
    let store = session.controller.store();
    let payload = export_backup(store).context("failed to build backup")?;
    let path = match args.out {
        Some(path) => path,
        None => session
            .out_dir
            .join(backup_file_name(store.clock().today())),
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create backup directory {}", parent.display()))?;
    }
    fs::write(&path, payload)
        .with_context(|| format!("failed to write backup {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

pub fn restore(args: RestoreArgs, session: &mut Session) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read backup {}", args.file.display()))?;
    let summary = import_backup(session.controller.store_mut(), &raw)
        .with_context(|| format!("failed to restore backup {}", args.file.display()))?;
    println!(
        "restored autosave={} completed={} settings={}",
        summary.auto_save, summary.completed, summary.settings
    );
    Ok(())
}

pub fn clear(session: &mut Session) -> Result<()> {
    if !session.controller.reset() {
        bail!("survey storage could not be cleared");
    }
    println!("cleared");
    Ok(())
}

pub fn info(session: &Session) -> Result<()> {
    let store = session.controller.store();
    let report = InfoReport {
        namespace: store.namespace(),
        storage: if session.store_dir.is_some() {
            "file"
        } else {
            "memory"
        },
        location: session
            .store_dir
            .as_ref()
            .map(|dir| dir.display().to_string()),
        output_dir: session.out_dir.display().to_string(),
        records: store.storage_info(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Prints the effective settings, saving them first when any flag is given.
pub fn settings(args: SettingsArgs, session: &mut Session) -> Result<()> {
    let store = session.controller.store_mut();
    let mut settings = store.load_settings();
    let mut changed = false;
    if let Some(theme) = args.theme {
        settings.theme = theme;
        changed = true;
    }
    if let Some(language) = args.language {
        settings.language = language;
        changed = true;
    }
    if let Some(auto_save) = args.auto_save {
        settings.auto_save = auto_save;
        changed = true;
    }
    if let Some(notifications) = args.notifications {
        settings.notifications = notifications;
        changed = true;
    }

    if changed {
        if !store.save_settings(&settings) {
            bail!("settings could not be saved");
        }
        settings = store.load_settings();
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
