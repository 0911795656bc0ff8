use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::answers::AnswerMap;
use crate::catalog::{COMMENTS_KEY, EMAIL_KEY, NAME_KEY, PHONE_KEY, QuestionCatalog, STUDENT_ID_KEY};
use crate::clock::{display_date, iso_date};
use crate::export::resolve::resolve_key;
use crate::export::{ExportContext, ExportError};

pub const CSV_HEADERS: [&str; 16] = [
    "Tarih",
    "Ad Soyad",
    "Öğrenci No",
    "E-posta",
    "Telefon",
    "Tercih Nedeni",
    "Hedef Alan",
    "Deneyim",
    "BT Beklentisi",
    "Programlama",
    "Zorlanacak Konu",
    "Öğrenme Yöntemi",
    "Siber Güvenlik",
    "İlgi Alanı",
    "Gelişim Alanı",
    "Yorumlar",
];

const PERSONAL_COLUMNS: [&str; 4] = [NAME_KEY, STUDENT_ID_KEY, EMAIL_KEY, PHONE_KEY];

const ANSWER_COLUMNS: [&str; 10] = [
    "reason",
    "career",
    "experience",
    "itexpectation",
    "programming",
    "difficulty",
    "learning",
    "security",
    "cybertopic",
    "development",
];

/// The single data row, aligned with [`CSV_HEADERS`].
pub fn csv_row(catalog: &QuestionCatalog, answers: &AnswerMap, ctx: &ExportContext) -> Vec<String> {
    let raw = |key: &str| answers.text(key).unwrap_or_default().to_string();

    let mut row = Vec::with_capacity(CSV_HEADERS.len());
    row.push(display_date(ctx.date));
    row.extend(PERSONAL_COLUMNS.into_iter().map(raw));
    row.extend(
        ANSWER_COLUMNS
            .into_iter()
            .map(|key| resolve_key(catalog, answers, key)),
    );
    row.push(raw(COMMENTS_KEY));
    row
}

/// Header line plus one row, every field double-quoted.
pub fn csv_bytes(
    catalog: &QuestionCatalog,
    answers: &AnswerMap,
    ctx: &ExportContext,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;
    writer.write_record(csv_row(catalog, answers, ctx))?;
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

pub fn csv_file_name(ctx: &ExportContext) -> String {
    format!("form_data_{}.csv", iso_date(ctx.date))
}
