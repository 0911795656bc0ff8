use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::answers::AnswerMap;
use crate::catalog::{EMAIL_KEY, NAME_KEY, PHONE_KEY, QuestionCatalog, STUDENT_ID_KEY};
use crate::clock::display_date;
use crate::export::ExportContext;
use crate::export::resolve::{comments, personal_value, resolve_answer, resolve_key};

/// Characters `encodeURIComponent` leaves untouched are the only ones not escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const SHARE_BASE: &str = "https://wa.me/";
/// Comments longer than this are cut in the short form.
pub const EXCERPT_CHARS: usize = 100;

/// Answers carried by the short share message, in order.
const SHORT_FORM_ANSWERS: [(&str, &str, &str); 4] = [
    ("🎯", "Tercih Nedeni", "reason"),
    ("💼", "Hedef Alan", "career"),
    ("💻", "Programlama", "programming"),
    ("🔐", "Siber Güvenlik", "security"),
];

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// Full plain-text rendition used as an email body.
pub fn long_text(catalog: &QuestionCatalog, answers: &AnswerMap, ctx: &ExportContext) -> String {
    let mut text = format!(
        "{}\n{}\nTarih: {}\n\n",
        catalog.title,
        catalog.subtitle,
        display_date(ctx.date)
    );
    text.push_str("KİŞİSEL BİLGİLER:\n");
    for (label, key) in [
        ("Ad Soyad", NAME_KEY),
        ("Öğrenci No", STUDENT_ID_KEY),
        ("E-posta", EMAIL_KEY),
        ("Telefon", PHONE_KEY),
    ] {
        text.push_str(&format!("{label}: {}\n", personal_value(answers, key)));
    }
    text.push_str("\nSORULAR VE YANITLAR:\n\n");

    for (index, question) in catalog.questions.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}: {}\n\n",
            index + 1,
            question.label,
            resolve_answer(answers, question)
        ));
    }

    if let Some(notes) = comments(answers) {
        text.push_str(&format!("Ek görüş ve öneriler: {notes}\n"));
    }
    text
}

pub fn email_subject(answers: &AnswerMap) -> String {
    let name = answers
        .text(NAME_KEY)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Öğrenci");
    format!("Öğrenci Formu - {name}")
}

/// `mailto:` URI with prefilled subject and body.
pub fn compose_uri(subject: &str, body: &str) -> String {
    format!(
        "mailto:?subject={}&body={}",
        encode_component(subject),
        encode_component(body)
    )
}

/// Compact rendition for length-limited messaging channels.
pub fn short_text(catalog: &QuestionCatalog, answers: &AnswerMap, ctx: &ExportContext) -> String {
    let mut text = format!(
        "🎓 *ÖĞRENCİ FORMU*\n📚 {}\n📅 {}\n\n",
        catalog.subtitle,
        display_date(ctx.date)
    );
    text.push_str(&format!(
        "👤 *{}*\n🆔 {}\n📧 {}\n\n",
        personal_value(answers, NAME_KEY),
        personal_value(answers, STUDENT_ID_KEY),
        personal_value(answers, EMAIL_KEY)
    ));

    for (icon, label, key) in SHORT_FORM_ANSWERS {
        text.push_str(&format!(
            "{icon} *{label}:* {}\n",
            resolve_key(catalog, answers, key)
        ));
    }
    text.push('\n');

    if let Some(notes) = comments(answers) {
        text.push_str(&format!(
            "💭 *Notlar:* {}\n",
            excerpt(notes, EXCERPT_CHARS)
        ));
    }
    text
}

/// First `limit` characters, with `...` appended when anything was cut.
pub fn excerpt(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Share link carrying a single `text` parameter.
pub fn share_uri(text: &str) -> String {
    format!("{SHARE_BASE}?text={}", encode_component(text))
}
