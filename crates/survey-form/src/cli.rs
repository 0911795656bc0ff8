use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, GlobalArgs, Session,
    answers::{SetArgs, ShowArgs, UnsetArgs},
    check::{CheckArgs, ValidateFieldArgs},
    export::ExportArgs,
    schema::SchemaArgs,
    storage::{BackupArgs, RestoreArgs, SettingsArgs},
};
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "survey-form",
    about = "Fill, check, submit and export the student intake survey",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store an answer (autosaved immediately)
    Set(SetArgs),
    /// Remove an answer and its companion text
    Unset(UnsetArgs),
    /// Print the current answers
    Show(ShowArgs),
    /// Validate the whole form or one section
    Check(CheckArgs),
    /// Report how far the form can be navigated
    Progress,
    /// Validate and store the completed submission
    Submit,
    /// Submit and export as a document, email link, share link or CSV file
    Export(ExportArgs),
    /// Write a JSON backup of all stored records
    Backup(BackupArgs),
    /// Load records from a JSON backup
    Restore(RestoreArgs),
    /// Delete all stored records
    Clear,
    /// Show where and what is stored
    Info,
    /// Show or change preferences
    Settings(SettingsArgs),
    /// Check a single value against a field format
    ValidateField(ValidateFieldArgs),
    /// Print the JSON Schema of a stored document
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ValidateField(args) => cmd::check::validate_field(args),
        Commands::Schema(args) => cmd::schema::run(args),
        command => {
            let mut session = Session::open(&cli.global)?;
            dispatch(command, &mut session)
        }
    }
}

pub fn dispatch(command: Commands, session: &mut Session) -> Result<()> {
    match command {
        Commands::Set(args) => cmd::answers::set(args, session),
        Commands::Unset(args) => cmd::answers::unset(args, session),
        Commands::Show(args) => cmd::answers::show(args, session),
        Commands::Check(args) => cmd::check::check(args, session),
        Commands::Progress => cmd::check::progress(session),
        Commands::Submit => cmd::export::submit(session),
        Commands::Export(args) => cmd::export::export(args, session),
        Commands::Backup(args) => cmd::storage::backup(args, session),
        Commands::Restore(args) => cmd::storage::restore(args, session),
        Commands::Clear => cmd::storage::clear(session),
        Commands::Info => cmd::storage::info(session),
        Commands::Settings(args) => cmd::storage::settings(args, session),
        Commands::ValidateField(args) => cmd::check::validate_field(args),
        Commands::Schema(args) => cmd::schema::run(args),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::cmd::check::FieldArg;
    use crate::cmd::export::ExportArg;

    #[test]
    fn parses_set_with_several_values() {
        let cli = Cli::try_parse_from([
            "survey-form",
            "--store-dir",
            "/tmp/state",
            "set",
            "topics",
            "cloud",
            "ai",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.global.store_dir.as_deref(), Some(Path::new("/tmp/state")));
        match cli.command {
            Commands::Set(args) => {
                assert_eq!(args.key, "topics");
                assert_eq!(args.values, vec!["cloud", "ai"]);
            }
            _ => panic!("expected set args"),
        }
    }

    #[test]
    fn set_requires_a_value() {
        assert!(Cli::try_parse_from(["survey-form", "set", "name"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "survey-form",
            "export",
            "csv",
            "--completed",
            "--memory",
            "--out-dir",
            "exports",
        ])
        .expect("expected CLI to parse");
        assert!(cli.global.memory);
        assert_eq!(cli.global.out_dir.as_deref(), Some(Path::new("exports")));
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.kind, ExportArg::Csv);
                assert!(args.completed);
            }
            _ => panic!("expected export args"),
        }
    }

    #[test]
    fn parses_validate_field_kind() {
        let cli = Cli::try_parse_from([
            "survey-form",
            "validate-field",
            "student-id",
            "123456",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::ValidateField(args) => {
                assert_eq!(args.kind, FieldArg::StudentId);
                assert_eq!(args.value, "123456");
            }
            _ => panic!("expected validate-field args"),
        }
    }

    #[test]
    fn backup_out_is_distinct_from_out_dir() {
        let cli = Cli::try_parse_from([
            "survey-form",
            "--out-dir",
            "exports",
            "backup",
            "--out",
            "state.json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Backup(args) => {
                assert_eq!(args.out.as_deref(), Some(Path::new("state.json")));
            }
            _ => panic!("expected backup args"),
        }
    }

    #[test]
    fn settings_flags_parse_booleans() {
        let cli = Cli::try_parse_from(["survey-form", "settings", "--auto-save", "false"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Settings(args) => assert_eq!(args.auto_save, Some(false)),
            _ => panic!("expected settings args"),
        }
    }
}
