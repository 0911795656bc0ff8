use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::answers::{AnswerMap, OTHER_SENTINEL};
use crate::catalog::{
    EMAIL_KEY, PHONE_KEY, QuestionCatalog, QuestionDescriptor, STUDENT_ID_KEY, Section,
};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
// Trunk prefix `0` is optional; the mobile prefix `5` must follow it.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0?5[0-9]{9}$").expect("phone pattern compiles"));
static STUDENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6,}$").expect("student id pattern compiles"));

const REQUIRED_MESSAGE: &str = "Bu alan zorunludur";
const SELECTION_MESSAGE: &str = "Lütfen bir seçenek işaretleyiniz";
const SINGLE_SELECTION_MESSAGE: &str = "Lütfen yalnızca bir seçenek işaretleyiniz";
const OTHER_TEXT_MESSAGE: &str = "Lütfen açıklama giriniz";

/// Syntax-checked field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Email,
    Phone,
    StudentId,
}

/// Outcome of a single field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCheck {
    pub valid: bool,
    pub message: &'static str,
}

impl FieldKind {
    /// Kind attached to a well-known answer key, if any.
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            EMAIL_KEY => Some(FieldKind::Email),
            PHONE_KEY => Some(FieldKind::Phone),
            STUDENT_ID_KEY => Some(FieldKind::StudentId),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FieldKind::Email => "Geçerli bir e-posta adresi giriniz",
            FieldKind::Phone => "Geçerli bir telefon numarası giriniz (05XX XXX XX XX)",
            FieldKind::StudentId => "Öğrenci numarası en az 6 haneli olmalıdır",
        }
    }

    fn code(self) -> &'static str {
        match self {
            FieldKind::Email => "invalid_email",
            FieldKind::Phone => "invalid_phone",
            FieldKind::StudentId => "invalid_student_id",
        }
    }

    /// Surrounding whitespace is ignored; only ASCII digits count as digits.
    pub fn is_valid(self, value: &str) -> bool {
        let value = value.trim();
        match self {
            FieldKind::Email => EMAIL_RE.is_match(value),
            FieldKind::Phone => {
                let digits: String = value.chars().filter(char::is_ascii_digit).collect();
                PHONE_RE.is_match(&digits)
            }
            FieldKind::StudentId => STUDENT_ID_RE.is_match(value),
        }
    }

    pub fn check(self, value: &str) -> FieldCheck {
        FieldCheck {
            valid: self.is_valid(value),
            message: self.message(),
        }
    }
}

/// Whether an issue belongs inline to a field or to a whole choice group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Field,
    Group,
}

/// Single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub key: String,
    pub level: IssueLevel,
    pub code: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn field(key: &str, code: &'static str, message: &str) -> Self {
        Self {
            key: key.to_string(),
            level: IssueLevel::Field,
            code,
            message: message.to_string(),
        }
    }

    fn group(key: &str, code: &'static str, message: &str) -> Self {
        Self {
            key: key.to_string(),
            level: IssueLevel::Group,
            code,
            message: message.to_string(),
        }
    }
}

/// Exhaustive result of an aggregate check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<FieldIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<FieldIssue>) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.key.as_str())
    }

    pub fn field_issues(&self) -> impl Iterator<Item = &FieldIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Field)
    }

    pub fn group_issues(&self) -> impl Iterator<Item = &FieldIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.level == IssueLevel::Group)
    }

    /// One `key: message` line per issue.
    pub fn summary(&self) -> Vec<String> {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.key, issue.message))
            .collect()
    }
}

/// Checks every required field and group of the form without stopping at the first failure.
pub fn validate_form(catalog: &QuestionCatalog, answers: &AnswerMap) -> ValidationReport {
    let mut issues = Vec::new();
    for section in &catalog.sections {
        check_section(catalog, section, answers, &mut issues);
    }

    // Groups the catalog declares but no section lists still gate submission.
    for question in catalog.required_groups() {
        let listed = catalog
            .sections
            .iter()
            .any(|section| section.questions.contains(&question.key));
        if !listed {
            check_group(question, answers, &mut issues);
        }
    }

    ValidationReport::from_issues(issues)
}

/// Same checks as [`validate_form`], restricted to one section. An unknown
/// index has nothing to check and passes.
pub fn validate_section(
    catalog: &QuestionCatalog,
    index: usize,
    answers: &AnswerMap,
) -> ValidationReport {
    let mut issues = Vec::new();
    if let Some(section) = catalog.section(index) {
        check_section(catalog, section, answers, &mut issues);
    }
    ValidationReport::from_issues(issues)
}

fn check_section(
    catalog: &QuestionCatalog,
    section: &Section,
    answers: &AnswerMap,
    issues: &mut Vec<FieldIssue>,
) {
    for key in &section.required_fields {
        if answers.is_blank(key) {
            issues.push(FieldIssue::field(key, "required", REQUIRED_MESSAGE));
        } else {
            check_syntax(key, answers, issues);
        }
    }

    for key in &section.optional_fields {
        if !answers.is_blank(key) {
            check_syntax(key, answers, issues);
        }
    }

    for question in catalog.section_groups(section) {
        check_group(question, answers, issues);
    }
}

fn check_syntax(key: &str, answers: &AnswerMap, issues: &mut Vec<FieldIssue>) {
    let Some(kind) = FieldKind::for_key(key) else {
        return;
    };
    let valid = answers
        .text(key)
        .is_some_and(|value| kind.is_valid(value));
    if !valid {
        issues.push(FieldIssue::field(key, kind.code(), kind.message()));
    }
}

fn check_group(question: &QuestionDescriptor, answers: &AnswerMap, issues: &mut Vec<FieldIssue>) {
    let Some(value) = answers.get(&question.key) else {
        issues.push(FieldIssue::group(
            &question.key,
            "missing_selection",
            SELECTION_MESSAGE,
        ));
        return;
    };

    match value.selection_count() {
        0 => issues.push(FieldIssue::group(
            &question.key,
            "missing_selection",
            SELECTION_MESSAGE,
        )),
        1 => {
            if value.contains(OTHER_SENTINEL) && answers.is_blank(&question.other_key) {
                issues.push(FieldIssue::field(
                    &question.other_key,
                    "missing_other_text",
                    OTHER_TEXT_MESSAGE,
                ));
            }
        }
        _ => issues.push(FieldIssue::group(
            &question.key,
            "multiple_selections",
            SINGLE_SELECTION_MESSAGE,
        )),
    }
}
