use anyhow::{Result, bail};
use clap::Args;
use survey_core::catalog::{EMAIL_KEY, NAME_KEY, PHONE_KEY, STUDENT_ID_KEY};
use survey_core::{AnswerValue, FieldKind, QuestionKind, personal_value, resolve_answer};

use crate::cmd::Session;

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Answer key, e.g. `email` or `reason`
    pub key: String,
    /// One value, or several for a multi-select question
    #[arg(required = true, num_args = 1..)]
    pub values: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UnsetArgs {
    pub key: String,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Print the raw answer map as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn set(args: SetArgs, session: &mut Session) -> Result<()> {
    let SetArgs { key, mut values } = args;
    let multi_select = session
        .controller
        .catalog()
        .question(&key)
        .is_some_and(|question| question.kind == QuestionKind::Multiple);
    let value = if !multi_select && values.len() == 1 {
        AnswerValue::Single(values.remove(0))
    } else {
        AnswerValue::Multiple(values)
    };

    if let Some(kind) = FieldKind::for_key(&key)
        && let Some(text) = value.as_str()
        && !kind.is_valid(text)
    {
        eprintln!("{key}: {}", kind.message());
    }

    if !session.controller.set_answer(&key, value) {
        bail!("answer for '{key}' could not be autosaved");
    }
    println!("saved {key}");
    Ok(())
}

pub fn unset(args: UnsetArgs, session: &mut Session) -> Result<()> {
    if !session.controller.clear_answer(&args.key) {
        bail!("removal of '{}' could not be autosaved", args.key);
    }
    println!("removed {}", args.key);
    Ok(())
}

pub fn show(args: ShowArgs, session: &Session) -> Result<()> {
    let answers = session.controller.answers();
    if args.json {
        println!("{}", serde_json::to_string_pretty(answers)?);
        return Ok(());
    }

    let catalog = session.controller.catalog();
    for (label, key) in [
        ("Ad Soyad", NAME_KEY),
        ("Öğrenci No", STUDENT_ID_KEY),
        ("E-posta", EMAIL_KEY),
        ("Telefon", PHONE_KEY),
    ] {
        println!("{label}: {}", personal_value(answers, key));
    }
    for (index, question) in catalog.questions.iter().enumerate() {
        println!(
            "{}. {}: {}",
            index + 1,
            question.label,
            resolve_answer(answers, question)
        );
    }
    Ok(())
}
