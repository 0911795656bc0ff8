use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use survey_core::{ExportContext, ExportKind, SubmitError, SubmitOutcome};

use crate::cmd::{Session, print_report};
use crate::deliver::FsDeliverer;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportArg {
    Document,
    Email,
    Share,
    Csv,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Document => ExportKind::Document,
            ExportArg::Email => ExportKind::Email,
            ExportArg::Share => ExportKind::Share,
            ExportArg::Csv => ExportKind::Csv,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub kind: ExportArg,
    /// Export the stored completed submission instead of submitting the current answers
    #[arg(long)]
    pub completed: bool,
}

pub fn submit(session: &mut Session) -> Result<()> {
    let outcome = submit_current(session)?;
    let actions: Vec<&str> = outcome.actions.iter().map(ExportKind::as_str).collect();
    println!("submitted; exports: {}", actions.join(", "));
    Ok(())
}

fn submit_current(session: &mut Session) -> Result<SubmitOutcome> {
    match session.controller.submit() {
        Ok(outcome) => {
            if !outcome.completed_saved {
                eprintln!("warning: completed submission could not be stored");
            }
            Ok(outcome)
        }
        Err(SubmitError::Invalid(report)) => {
            print_report(&report);
            bail!("form has {} validation issue(s)", report.issues.len())
        }
        Err(err) => Err(err.into()),
    }
}

pub fn export(args: ExportArgs, session: &mut Session) -> Result<()> {
    let kind = ExportKind::from(args.kind);
    let mut deliverer = FsDeliverer::new(&session.out_dir);

    if args.completed {
        let controller = &session.controller;
        let Some(answers) = controller.store().load_completed() else {
            bail!("no completed submission is stored");
        };
        let ctx = ExportContext::today(controller.store().clock());
        controller
            .exporter()
            .export(kind, controller.catalog(), &answers, &ctx, &mut deliverer)
            .with_context(|| format!("{} export failed", kind.as_str()))?;
    } else {
        submit_current(session)?;
        session
            .controller
            .export(kind, &mut deliverer)
            .with_context(|| format!("{} export failed", kind.as_str()))?;
    }

    for line in deliverer.reported() {
        println!("{line}");
    }
    Ok(())
}
