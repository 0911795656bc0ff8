use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Answer key of the student's full name.
pub const NAME_KEY: &str = "name";
/// Answer key of the student number.
pub const STUDENT_ID_KEY: &str = "studentNo";
pub const EMAIL_KEY: &str = "email";
pub const PHONE_KEY: &str = "phone";
/// Optional free-text comments rendered after the question rows.
pub const COMMENTS_KEY: &str = "comments";

/// How a catalog question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Required group where exactly one option is selected.
    Single,
    /// Optional multi-select; answers are kept in selection order.
    Multiple,
}

/// Immutable description of one catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionDescriptor {
    pub label: String,
    pub key: String,
    pub other_key: String,
    pub kind: QuestionKind,
}

impl QuestionDescriptor {
    pub fn single(label: &str, key: &str) -> Self {
        Self::new(label, key, QuestionKind::Single)
    }

    pub fn multiple(label: &str, key: &str) -> Self {
        Self::new(label, key, QuestionKind::Multiple)
    }

    fn new(label: &str, key: &str, kind: QuestionKind) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
            other_key: format!("{key}_other"),
            kind,
        }
    }

    pub fn is_required_group(&self) -> bool {
        self.kind == QuestionKind::Single
    }
}

/// One navigable step of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional_fields: Vec<String>,
    /// Keys of catalog questions shown in this section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<String>,
}

/// Fixed, ordered question catalog driving validation and export order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionCatalog {
    pub title: String,
    pub subtitle: String,
    pub questions: Vec<QuestionDescriptor>,
    pub sections: Vec<Section>,
}

impl QuestionCatalog {
    /// The student introduction and expectations form.
    pub fn student_intake() -> Self {
        let questions = vec![
            QuestionDescriptor::single("Bölüm tercih nedeni", "reason"),
            QuestionDescriptor::single("Hedef çalışma alanı", "career"),
            QuestionDescriptor::single("Önceki deneyim", "experience"),
            QuestionDescriptor::single("BT dersi beklentisi", "itexpectation"),
            QuestionDescriptor::multiple("Gelişim konuları", "topics"),
            QuestionDescriptor::single("Programlama deneyimi", "programming"),
            QuestionDescriptor::single("Zorlanılacak konu", "difficulty"),
            QuestionDescriptor::single("Öğrenme yöntemi", "learning"),
            QuestionDescriptor::single("Siber güvenlik düzeyi", "security"),
            QuestionDescriptor::single("İlgi alanı (Siber)", "cybertopic"),
            QuestionDescriptor::multiple("Güvenlik alışkanlıkları", "habits"),
            QuestionDescriptor::single("Gelişim alanı", "development"),
        ];

        let sections = vec![
            section(
                "Kişisel Bilgiler",
                &[NAME_KEY, STUDENT_ID_KEY, EMAIL_KEY],
                &[PHONE_KEY],
                &[],
            ),
            section(
                "Bölüm Tercihi ve Kariyer",
                &[],
                &[],
                &["reason", "career", "experience"],
            ),
            section(
                "Bilgi Teknolojileri",
                &[],
                &[],
                &["itexpectation", "topics", "programming"],
            ),
            section("Öğrenme", &[], &[], &["difficulty", "learning"]),
            section(
                "Siber Güvenlik",
                &[],
                &[],
                &["security", "cybertopic", "habits"],
            ),
            section(
                "Gelişim ve Görüşler",
                &[],
                &[COMMENTS_KEY],
                &["development"],
            ),
        ];

        Self {
            title: "ÖĞRENCİ TANIŞMA VE BEKLENTİ FORMU".into(),
            subtitle: "Kurumsal Bilişim Uzmanlığı Bölümü".into(),
            questions,
            sections,
        }
    }

    pub fn question(&self, key: &str) -> Option<&QuestionDescriptor> {
        self.questions.iter().find(|question| question.key == key)
    }

    /// Free-text key paired with a question's `other` option.
    pub fn companion_key(&self, key: &str) -> Option<&str> {
        self.question(key).map(|question| question.other_key.as_str())
    }

    pub fn required_groups(&self) -> impl Iterator<Item = &QuestionDescriptor> {
        self.questions
            .iter()
            .filter(|question| question.is_required_group())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.required_fields.iter().map(String::as_str))
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Required single-choice groups shown in the given section.
    pub fn section_groups<'a>(
        &'a self,
        section: &'a Section,
    ) -> impl Iterator<Item = &'a QuestionDescriptor> + 'a {
        section
            .questions
            .iter()
            .filter_map(|key| self.question(key))
            .filter(|question| question.is_required_group())
    }
}

impl Default for QuestionCatalog {
    fn default() -> Self {
        Self::student_intake()
    }
}

fn section(title: &str, required: &[&str], optional: &[&str], questions: &[&str]) -> Section {
    let owned = |keys: &[&str]| keys.iter().map(|key| key.to_string()).collect::<Vec<_>>();
    Section {
        title: title.to_string(),
        required_fields: owned(required),
        optional_fields: owned(optional),
        questions: owned(questions),
    }
}
