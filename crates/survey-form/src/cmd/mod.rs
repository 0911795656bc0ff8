pub mod answers;
pub mod check;
pub mod export;
pub mod schema;
pub mod storage;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use survey_core::{
    Exporter, FormController, FormStateStore, TextDocumentRenderer, ValidationReport,
};
use tracing::debug;

use crate::backend::FileBackend;
use crate::config::{RendererKind, StorageKind, SurveyConfig};

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file to use instead of the platform default
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the persisted survey records
    #[arg(long = "store-dir", value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,
    /// Keep state in memory for this invocation only
    #[arg(long, global = true)]
    pub memory: bool,
    /// Directory receiving exported files
    #[arg(long = "out-dir", value_name = "DIR", global = true)]
    pub out_dir: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// One CLI invocation: resolved config plus the controller over its store.
pub struct Session {
    pub config: SurveyConfig,
    pub store_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub controller: FormController,
}

impl Session {
    pub fn open(globals: &GlobalArgs) -> Result<Self> {
        let config = SurveyConfig::load(globals.config.as_deref())?;
        Self::with_config(config, globals)
    }

    /// Flags win over config values; an explicit `--store-dir` selects file storage.
    pub fn with_config(config: SurveyConfig, globals: &GlobalArgs) -> Result<Self> {
        let catalog = config.load_catalog()?;
        let in_memory = globals.memory
            || (config.storage == StorageKind::Memory && globals.store_dir.is_none());

        let (store, store_dir) = if in_memory {
            (FormStateStore::in_memory(), None)
        } else {
            let dir = globals
                .store_dir
                .clone()
                .unwrap_or_else(|| config.data_dir());
            (FormStateStore::new(FileBackend::new(&dir)), Some(dir))
        };
        let store = store.with_namespace(config.namespace.clone());

        let exporter = match config.document_renderer {
            RendererKind::Pdf => Exporter::new(),
            RendererKind::Text => Exporter::with_renderer(TextDocumentRenderer::default()),
            RendererKind::None => Exporter::without_renderer(),
        };
        let out_dir = globals
            .out_dir
            .clone()
            .unwrap_or_else(|| config.output_dir());

        debug!(
            store = ?store_dir,
            out = %out_dir.display(),
            namespace = %config.namespace,
            "opened survey session"
        );
        Ok(Self {
            controller: FormController::new(catalog, store, exporter),
            config,
            store_dir,
            out_dir,
        })
    }
}

pub(crate) fn print_report(report: &ValidationReport) {
    for line in report.summary() {
        println!("{line}");
    }
}
