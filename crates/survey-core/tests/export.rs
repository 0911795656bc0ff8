use time::{Date, Month};

use survey_core::export::document::{Element, PAGE_HEIGHT, ROW_BREAK_AT};
use survey_core::export::message::{EXCERPT_CHARS, encode_component, excerpt};
use survey_core::export::{
    CSV_HEADERS, compose_uri, csv_bytes, document_file_name, long_text, share_uri, short_text,
};
use survey_core::{
    AnswerMap, Delivery, DocumentLayout, DocumentRenderer, ExportContext, ExportError, ExportKind,
    Exporter, PdfDocumentRenderer, QuestionCatalog, QuestionDescriptor, TextDocumentRenderer,
    resolve_answer,
};

fn ctx() -> ExportContext {
    ExportContext::on(Date::from_calendar_date(2026, Month::October, 19).expect("date"))
}

fn answers() -> AnswerMap {
    let mut answers = AnswerMap::new();
    answers.set("name", "Ayşe Yılmaz");
    answers.set("studentNo", "20231234");
    answers.set("email", "ayse@example.com");
    answers.set("reason", "other");
    answers.set("reason_other", "X");
    answers.set("career", "Yazılım geliştirme");
    answers.set("topics", vec!["a", "b"]);
    answers.set("programming", "Başlangıç");
    answers.set("security", "Orta");
    answers
}

#[test]
fn other_answers_use_companion_text() {
    let catalog = QuestionCatalog::student_intake();
    let reason = catalog.question("reason").expect("reason question");
    assert_eq!(resolve_answer(&answers(), reason), "X");

    let text = long_text(&catalog, &answers(), &ctx());
    assert!(text.contains("1. Bölüm tercih nedeni: X\n"), "{text}");
    assert!(text.contains("5. Gelişim konuları: a, b\n"), "{text}");
    assert!(text.contains("3. Önceki deneyim: -\n"), "{text}");
}

#[test]
fn resolve_edge_cases() {
    let question = QuestionDescriptor::single("Soru", "q");
    let mut answers = AnswerMap::new();
    assert_eq!(resolve_answer(&answers, &question), "-");

    answers.set("q", "other");
    assert_eq!(resolve_answer(&answers, &question), "other");

    answers.set("q", Vec::<String>::new());
    assert_eq!(resolve_answer(&answers, &question), "-");

    answers.set("q", "   ");
    assert_eq!(resolve_answer(&answers, &question), "-");
}

#[test]
fn formats_agree_on_personal_fields() {
    let catalog = QuestionCatalog::student_intake();
    let answers = answers();
    let layout = DocumentLayout::build(&catalog, &answers, &ctx());
    let texts: Vec<&str> = layout.texts().collect();
    assert!(texts.contains(&"Ad Soyad: Ayşe Yılmaz"));
    assert!(texts.contains(&"Öğrenci No: 20231234"));
    assert!(texts.contains(&"Telefon: -"));
    assert!(texts.contains(&"Tarih: 19.10.2026"));

    let long = long_text(&catalog, &answers, &ctx());
    assert!(long.contains("Ad Soyad: Ayşe Yılmaz\n"));
    assert!(long.contains("Öğrenci No: 20231234\n"));

    let short = short_text(&catalog, &answers, &ctx());
    assert!(short.contains("👤 *Ayşe Yılmaz*\n"));
    assert!(short.contains("🆔 20231234\n"));
    assert!(short.contains("🎯 *Tercih Nedeni:* X\n"));
    assert!(short.contains("📅 19.10.2026\n"));
}

#[test]
fn message_texts_open_with_header_and_personal_block() {
    let catalog = QuestionCatalog::student_intake();
    let long = long_text(&catalog, &answers(), &ctx());
    assert!(long.starts_with(
        "ÖĞRENCİ TANIŞMA VE BEKLENTİ FORMU\n\
         Kurumsal Bilişim Uzmanlığı Bölümü\n\
         Tarih: 19.10.2026\n\n\
         KİŞİSEL BİLGİLER:\n\
         Ad Soyad: Ayşe Yılmaz\n\
         Öğrenci No: 20231234\n\
         E-posta: ayse@example.com\n\
         Telefon: -\n\n\
         SORULAR VE YANITLAR:\n\n1. "
    ), "{long}");

    let short = short_text(&catalog, &answers(), &ctx());
    assert!(short.starts_with(
        "🎓 *ÖĞRENCİ FORMU*\n📚 Kurumsal Bilişim Uzmanlığı Bölümü\n📅 19.10.2026\n\n👤 *Ayşe Yılmaz*\n"
    ), "{short}");
}

#[test]
fn short_form_truncates_long_comments() {
    let catalog = QuestionCatalog::student_intake();
    let mut answers = answers();
    answers.set("comments", "ç".repeat(150));
    let short = short_text(&catalog, &answers, &ctx());
    let expected = format!("💭 *Notlar:* {}...\n", "ç".repeat(EXCERPT_CHARS));
    assert!(short.contains(&expected));

    assert_eq!(excerpt("kısa", 100), "kısa");
    assert_eq!(excerpt("abcdef", 3), "abc...");

    answers.remove("comments");
    assert!(!short_text(&catalog, &answers, &ctx()).contains("Notlar"));
}

#[test]
fn document_fits_one_page_for_default_catalog() {
    let catalog = QuestionCatalog::student_intake();
    let mut answers = answers();
    answers.set("comments", "Teşekkürler");
    let layout = DocumentLayout::build(&catalog, &answers, &ctx());
    assert_eq!(layout.page_count(), 1);
    let texts: Vec<&str> = layout.texts().collect();
    assert!(texts.contains(&"Ek Görüş ve Öneriler:"));
    assert!(texts.contains(&"Teşekkürler"));
    assert!(texts.contains(&"1. Bölüm tercih nedeni:"));
    assert!(texts.contains(&"Bu form otomatik olarak oluşturulmuştur."));
}

#[test]
fn long_catalog_spills_onto_new_pages() {
    let mut catalog = QuestionCatalog::student_intake();
    catalog.questions = (0..60)
        .map(|n| QuestionDescriptor::single(&format!("Soru {n}"), &format!("q{n}")))
        .collect();
    let layout = DocumentLayout::build(&catalog, &AnswerMap::new(), &ctx());
    assert!(layout.page_count() >= 3, "pages: {}", layout.page_count());
    assert!(layout.pages[1].texts().any(|text| text.starts_with("24. ")));

    let rendered = TextDocumentRenderer::default()
        .render(&layout)
        .expect("render text document");
    let rendered = String::from_utf8(rendered).expect("utf8");
    assert_eq!(rendered.matches('\u{c}').count(), layout.page_count() - 1);
}

#[test]
fn long_wrapped_answer_breaks_across_pages() {
    let catalog = QuestionCatalog::student_intake();
    let mut answers = answers();
    answers.set("development", "other");
    answers.set("development_other", "word ".repeat(1200));
    let layout = DocumentLayout::build(&catalog, &answers, &ctx());
    assert!(layout.page_count() >= 2, "pages: {}", layout.page_count());

    for (page_index, page) in layout.pages.iter().enumerate() {
        for element in &page.elements {
            if let Element::Text { y, text, .. } = element {
                assert!(*y <= PAGE_HEIGHT, "page {page_index}: {text:?} at y={y}");
                if text.starts_with("word") {
                    assert!(*y <= ROW_BREAK_AT, "page {page_index}: answer line at y={y}");
                }
            }
        }
    }
}

#[test]
fn pdf_document_has_one_page_object_per_layout_page() {
    let mut catalog = QuestionCatalog::student_intake();
    catalog.questions = (0..60)
        .map(|n| QuestionDescriptor::single(&format!("Soru {n}"), &format!("q{n}")))
        .collect();
    let layout = DocumentLayout::build(&catalog, &answers(), &ctx());
    let pdf = PdfDocumentRenderer
        .render(&layout)
        .expect("render pdf document");

    assert!(pdf.starts_with(b"%PDF-"));
    let count = format!("/Count {}", layout.page_count());
    assert!(contains(&pdf, count.as_bytes()), "missing {count}");
    assert!(contains(&pdf, b"/Helvetica-Bold"));
    assert!(contains(&pdf, b"/Scedilla"));
    assert!(contains(&pdf, b"FORM YANITLARI"));
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[test]
fn comment_panel_clips_overflow() {
    let catalog = QuestionCatalog::student_intake();
    let mut answers = answers();
    answers.set("comments", "kelime ".repeat(400));
    let layout = DocumentLayout::build(&catalog, &answers, &ctx());
    let comment_lines = layout
        .texts()
        .filter(|text| text.starts_with("kelime"))
        .count();
    assert_eq!(comment_lines, 5);
}

#[test]
fn document_file_name_is_sanitized() {
    assert_eq!(
        document_file_name(&answers(), &ctx(), "txt"),
        "Ayşe_Yılmaz_20231234_2026-10-19.txt"
    );
    let mut unnamed = AnswerMap::new();
    unnamed.set("name", "  ");
    assert_eq!(
        document_file_name(&unnamed, &ctx(), "pdf"),
        "ogrenci__2026-10-19.pdf"
    );
}

#[test]
fn csv_has_header_and_one_quoted_row() {
    let catalog = QuestionCatalog::student_intake();
    let bytes = csv_bytes(&catalog, &answers(), &ctx()).expect("csv bytes");
    let text = String::from_utf8(bytes.clone()).expect("utf8");
    assert!(text.starts_with("\"Tarih\",\"Ad Soyad\",\"Öğrenci No\""));
    assert_eq!(text.lines().count(), 2);

    let mut reader = csv::ReaderBuilder::new().from_reader(bytes.as_slice());
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.len(), CSV_HEADERS.len());
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.len(), 16);
    assert_eq!(&row[0], "19.10.2026");
    assert_eq!(&row[1], "Ayşe Yılmaz");
    assert_eq!(&row[4], "");
    assert_eq!(&row[5], "X");
    assert_eq!(&row[7], "-");
    assert_eq!(&row[15], "");

    let data_line = text.lines().nth(1).expect("data line");
    assert!(data_line.contains(",\"\","));
}

#[test]
fn uris_escape_like_uri_components() {
    assert_eq!(encode_component("a b&c=d"), "a%20b%26c%3Dd");
    assert_eq!(encode_component("(ok)!*'~-_."), "(ok)!*'~-_.");
    assert_eq!(
        compose_uri("Öğrenci Formu - Ali", "a b\n"),
        "mailto:?subject=%C3%96%C4%9Frenci%20Formu%20-%20Ali&body=a%20b%0A"
    );
    assert_eq!(share_uri("merhaba dünya"), "https://wa.me/?text=merhaba%20d%C3%BCnya");
}

#[test]
fn exporter_prepares_each_kind() {
    let catalog = QuestionCatalog::student_intake();
    let exporter = Exporter::new();
    let answers = answers();

    let document = exporter
        .prepare(ExportKind::Document, &catalog, &answers, &ctx())
        .expect("document");
    assert_eq!(document.file_name(), Some("Ayşe_Yılmaz_20231234_2026-10-19.pdf"));
    assert!(matches!(
        document,
        Delivery::File { media_type: "application/pdf", ref bytes, .. } if bytes.starts_with(b"%PDF-")
    ));

    let text = Exporter::with_renderer(TextDocumentRenderer::default())
        .prepare(ExportKind::Document, &catalog, &answers, &ctx())
        .expect("text document");
    assert_eq!(text.file_name(), Some("Ayşe_Yılmaz_20231234_2026-10-19.txt"));

    let email = exporter
        .prepare(ExportKind::Email, &catalog, &answers, &ctx())
        .expect("email");
    let uri = email.uri().expect("compose uri");
    assert!(uri.starts_with("mailto:?subject=%C3%96%C4%9Frenci%20Formu%20-%20Ay%C5%9Fe"));

    let share = exporter
        .prepare(ExportKind::Share, &catalog, &answers, &ctx())
        .expect("share");
    assert!(matches!(share, Delivery::Share { ref uri } if uri.starts_with("https://wa.me/?text=")));

    let csv = exporter
        .prepare(ExportKind::Csv, &catalog, &answers, &ctx())
        .expect("csv");
    assert_eq!(csv.file_name(), Some("form_data_2026-10-19.csv"));
}

#[test]
fn missing_renderer_fails_only_documents() {
    let catalog = QuestionCatalog::student_intake();
    let exporter = Exporter::without_renderer();
    assert!(!exporter.has_renderer());

    let mut sink: Vec<Delivery> = Vec::new();
    let err = exporter
        .export(ExportKind::Document, &catalog, &answers(), &ctx(), &mut sink)
        .expect_err("no renderer");
    assert!(matches!(err, ExportError::RendererUnavailable));
    assert!(sink.is_empty());

    exporter
        .export(ExportKind::Email, &catalog, &answers(), &ctx(), &mut sink)
        .expect("email export");
    assert_eq!(sink.len(), 1);
}
