use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use survey_core::{DEFAULT_NAMESPACE, QuestionCatalog};
use tracing::debug;

pub const CONFIG_FILE: &str = "survey.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    #[default]
    Pdf,
    Text,
    None,
}

/// Settings read from `survey.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    pub namespace: String,
    pub storage: StorageKind,
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// JSON question catalog replacing the built-in one.
    pub catalog: Option<PathBuf>,
    pub document_renderer: RendererKind,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage: StorageKind::File,
            data_dir: None,
            output_dir: None,
            catalog: None,
            document_renderer: RendererKind::Pdf,
        }
    }
}

impl SurveyConfig {
    /// Reads `explicit` when given, otherwise `survey.toml` in the platform
    /// config directory when present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "loaded survey config");
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".survey"))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Configured catalog, or the built-in student intake form.
    pub fn load_catalog(&self) -> Result<QuestionCatalog> {
        let Some(path) = &self.catalog else {
            return Ok(QuestionCatalog::student_intake());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let catalog: QuestionCatalog = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse catalog {}", path.display()))?;
        check_catalog(&catalog).with_context(|| format!("invalid catalog {}", path.display()))?;
        Ok(catalog)
    }
}

fn check_catalog(catalog: &QuestionCatalog) -> Result<()> {
    if catalog.sections.is_empty() {
        bail!("catalog declares no sections");
    }
    for section in &catalog.sections {
        if let Some(key) = section
            .questions
            .iter()
            .find(|key| catalog.question(key).is_none())
        {
            bail!("section '{}' references unknown question '{key}'", section.title);
        }
    }
    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "survey", "survey-form")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
