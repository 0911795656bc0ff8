use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use survey_core::{FieldKind, NavigationController, NavigationError, validate_section};

use crate::cmd::{Session, print_report};

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Check only this section (1-based)
    #[arg(long, value_name = "N")]
    pub section: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldArg {
    Email,
    Phone,
    StudentId,
}

impl From<FieldArg> for FieldKind {
    fn from(arg: FieldArg) -> Self {
        match arg {
            FieldArg::Email => FieldKind::Email,
            FieldArg::Phone => FieldKind::Phone,
            FieldArg::StudentId => FieldKind::StudentId,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ValidateFieldArgs {
    #[arg(value_enum)]
    pub kind: FieldArg,
    pub value: String,
}

pub fn check(args: CheckArgs, session: &Session) -> Result<()> {
    let controller = &session.controller;
    let report = match args.section {
        Some(0) => bail!("sections are numbered from 1"),
        Some(number) => {
            let index = number - 1;
            if controller.catalog().section(index).is_none() {
                bail!(
                    "section {number} does not exist (form has {})",
                    controller.catalog().section_count()
                );
            }
            validate_section(controller.catalog(), index, controller.answers())
        }
        None => controller.validate(),
    };

    if report.is_valid() {
        println!("ok");
        return Ok(());
    }
    print_report(&report);
    bail!("{} validation issue(s)", report.issues.len())
}

/// Walks forward from the first section while sections validate and
/// reports the section where the walk stops.
pub fn progress(session: &Session) -> Result<()> {
    let catalog = session.controller.catalog();
    let answers = session.controller.answers();
    let mut navigation = NavigationController::for_catalog(catalog);

    let report = match navigation.advance_while_valid(catalog, answers) {
        Ok(_) => validate_section(catalog, navigation.index(), answers),
        Err(NavigationError::SectionIncomplete { report, .. }) => report,
    };

    let progress = navigation.progress();
    let title = catalog
        .section(progress.index)
        .map(|section| section.title.as_str())
        .unwrap_or_default();
    println!("{} ({:.0}%) {title}", progress.label(), progress.percent());
    print_report(&report);
    Ok(())
}

pub fn validate_field(args: ValidateFieldArgs) -> Result<()> {
    let check = FieldKind::from(args.kind).check(&args.value);
    if !check.valid {
        bail!("{}", check.message);
    }
    println!("ok");
    Ok(())
}
