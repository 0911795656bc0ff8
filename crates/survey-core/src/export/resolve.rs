use crate::answers::{AnswerMap, AnswerValue, OTHER_SENTINEL};
use crate::catalog::{COMMENTS_KEY, QuestionCatalog, QuestionDescriptor};

/// Shown wherever an answer is missing.
pub const PLACEHOLDER: &str = "-";

/// Display text of a catalog question's answer.
///
/// The `other` sentinel is replaced by the companion free text, lists are
/// joined with `", "`, and a missing or blank answer becomes `-`. Every export
/// goes through this function so the formats never disagree.
pub fn resolve_answer(answers: &AnswerMap, question: &QuestionDescriptor) -> String {
    match answers.get(&question.key) {
        Some(AnswerValue::Single(value)) if value == OTHER_SENTINEL => answers
            .get(&question.other_key)
            .and_then(display_value)
            .unwrap_or_else(|| value.clone()),
        Some(value) => display_value(value).unwrap_or_else(|| PLACEHOLDER.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

/// Resolves `key` through the catalog when it names a question, otherwise as a plain field.
pub fn resolve_key(catalog: &QuestionCatalog, answers: &AnswerMap, key: &str) -> String {
    match catalog.question(key) {
        Some(question) => resolve_answer(answers, question),
        None => personal_value(answers, key),
    }
}

/// Display text of a free-standing field such as name or student number.
pub fn personal_value(answers: &AnswerMap, key: &str) -> String {
    answers
        .get(key)
        .and_then(display_value)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Comments text when present and not blank.
pub fn comments(answers: &AnswerMap) -> Option<&str> {
    answers
        .text(COMMENTS_KEY)
        .filter(|text| !text.trim().is_empty())
}

fn display_value(value: &AnswerValue) -> Option<String> {
    match value {
        AnswerValue::Single(text) if text.trim().is_empty() => None,
        AnswerValue::Single(text) => Some(text.clone()),
        AnswerValue::Multiple(items) => {
            let kept: Vec<&str> = items
                .iter()
                .map(String::as_str)
                .filter(|item| !item.trim().is_empty())
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(kept.join(", "))
            }
        }
    }
}
