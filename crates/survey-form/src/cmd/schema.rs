use anyhow::Result;
use clap::{Args, ValueEnum};
use schemars::schema_for;
use survey_core::{AutosaveSnapshot, BackupDocument, CompletedSnapshot, QuestionCatalog, Settings};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaTarget {
    Autosave,
    Completed,
    Settings,
    Backup,
    Catalog,
}

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub target: SchemaTarget,
}

/// Prints the JSON Schema of a persisted or configurable document.
pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = match args.target {
        SchemaTarget::Autosave => schema_for!(AutosaveSnapshot),
        SchemaTarget::Completed => schema_for!(CompletedSnapshot),
        SchemaTarget::Settings => schema_for!(Settings),
        SchemaTarget::Backup => schema_for!(BackupDocument),
        SchemaTarget::Catalog => schema_for!(QuestionCatalog),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
