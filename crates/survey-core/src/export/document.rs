use serde::Serialize;

use crate::answers::AnswerMap;
use crate::catalog::{EMAIL_KEY, NAME_KEY, PHONE_KEY, QuestionCatalog, STUDENT_ID_KEY};
use crate::clock::{display_date, iso_date};
use crate::export::resolve::{comments, personal_value, resolve_answer};
use crate::export::{ExportContext, ExportError};

// A4 portrait, millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 15.0;

const HEADER_HEIGHT: f32 = 30.0;
const ANSWERS_TOP: f32 = 75.0;
const ANSWER_COLUMN: f32 = 45.0;
const ROW_STEP: f32 = 8.0;
const LINE_STEP: f32 = 4.0;
/// A question row or wrapped answer line starting below this offset moves to a new page.
pub const ROW_BREAK_AT: f32 = 260.0;
const COMMENTS_BREAK_AT: f32 = 250.0;
const COMMENTS_HEIGHT: f32 = 30.0;
const FOOTER_Y: f32 = 285.0;
const FOOTER_TEXT: &str = "Bu form otomatik olarak oluşturulmuştur.";

const DEFAULT_FILE_STEM: &str = "ogrenci";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

const ACCENT: Rgb = Rgb(94, 114, 228);
const WHITE: Rgb = Rgb(255, 255, 255);
const BLACK: Rgb = Rgb(0, 0, 0);
const MUTED: Rgb = Rgb(100, 100, 100);
const LABEL: Rgb = Rgb(60, 60, 60);
const FAINT: Rgb = Rgb(150, 150, 150);
const PANEL: Rgb = Rgb(240, 242, 245);
const STRIPE: Rgb = Rgb(248, 249, 250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
    pub color: Rgb,
}

impl TextStyle {
    const fn new(size: f32, bold: bool, color: Rgb) -> Self {
        Self { size, bold, color }
    }
}

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
        align: Align,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Fill { .. } => None,
        })
    }
}

/// Paginated, renderer-independent description of the answers document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentLayout {
    pub width: f32,
    pub height: f32,
    pub pages: Vec<Page>,
}

impl DocumentLayout {
    pub fn build(catalog: &QuestionCatalog, answers: &AnswerMap, ctx: &ExportContext) -> Self {
        let mut builder = LayoutBuilder::new();
        builder.header(catalog);
        builder.personal_info(answers, ctx);
        builder.answers(catalog, answers);
        if let Some(text) = comments(answers) {
            builder.comments(text);
        }
        builder.footer();
        builder.finish()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

struct LayoutBuilder {
    pages: Vec<Page>,
    y: f32,
}

impl LayoutBuilder {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: 0.0,
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn fill(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push(Element::Fill {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn text(&mut self, x: f32, y: f32, text: impl Into<String>, style: TextStyle) {
        self.push(Element::Text {
            x,
            y,
            text: text.into(),
            style,
            align: Align::Left,
        });
    }

    fn centered(&mut self, y: f32, text: impl Into<String>, style: TextStyle) {
        self.push(Element::Text {
            x: PAGE_WIDTH / 2.0,
            y,
            text: text.into(),
            style,
            align: Align::Center,
        });
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    fn header(&mut self, catalog: &QuestionCatalog) {
        self.fill(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT, ACCENT);
        self.centered(15.0, catalog.title.as_str(), TextStyle::new(16.0, false, WHITE));
        self.centered(22.0, catalog.subtitle.as_str(), TextStyle::new(12.0, false, WHITE));
    }

    fn personal_info(&mut self, answers: &AnswerMap, ctx: &ExportContext) {
        let body = TextStyle::new(9.0, false, BLACK);
        let second_column = MARGIN + 70.0;
        self.y = 40.0;
        self.text(
            MARGIN,
            self.y,
            format!("Tarih: {}", display_date(ctx.date)),
            TextStyle::new(9.0, false, MUTED),
        );
        self.y += 8.0;

        let top = self.y;
        self.fill(MARGIN, top, PAGE_WIDTH - MARGIN * 2.0, 25.0, PANEL);
        self.text(
            MARGIN + 2.0,
            top + 5.0,
            "KİŞİSEL BİLGİLER",
            TextStyle::new(11.0, true, ACCENT),
        );
        let rows = [
            (MARGIN + 2.0, top + 11.0, "Ad Soyad", NAME_KEY),
            (second_column, top + 11.0, "Öğrenci No", STUDENT_ID_KEY),
            (MARGIN + 2.0, top + 17.0, "E-posta", EMAIL_KEY),
            (second_column, top + 17.0, "Telefon", PHONE_KEY),
        ];
        for (x, y, label, key) in rows {
            self.text(x, y, format!("{label}: {}", personal_value(answers, key)), body);
        }
    }

    fn answers(&mut self, catalog: &QuestionCatalog, answers: &AnswerMap) {
        let label_style = TextStyle::new(9.0, true, LABEL);
        let answer_style = TextStyle::new(9.0, false, BLACK);
        let answer_x = MARGIN + ANSWER_COLUMN;
        let answer_width = PAGE_WIDTH - ANSWER_COLUMN - MARGIN;

        self.y = ANSWERS_TOP;
        self.text(
            MARGIN,
            self.y,
            "FORM YANITLARI",
            TextStyle::new(11.0, true, ACCENT),
        );
        self.y += 7.0;

        for (index, question) in catalog.questions.iter().enumerate() {
            if self.y > ROW_BREAK_AT {
                self.new_page();
            }
            if index % 2 == 0 {
                self.fill(
                    MARGIN,
                    self.y - 3.0,
                    PAGE_WIDTH - MARGIN * 2.0,
                    ROW_STEP,
                    STRIPE,
                );
            }
            self.text(
                MARGIN + 2.0,
                self.y,
                format!("{}. {}:", index + 1, question.label),
                label_style,
            );

            let answer = resolve_answer(answers, question);
            let lines = wrap_text(&answer, chars_per_line(answer_width, answer_style.size));
            for (line_index, line) in lines.into_iter().enumerate() {
                if line_index > 0 {
                    self.y += LINE_STEP;
                    if self.y > ROW_BREAK_AT {
                        self.new_page();
                    }
                }
                self.text(answer_x, self.y, line, answer_style);
            }
            self.y += ROW_STEP;
        }
    }

    fn comments(&mut self, text: &str) {
        if self.y > COMMENTS_BREAK_AT {
            self.new_page();
        }
        let top = self.y;
        let style = TextStyle::new(8.0, false, BLACK);
        self.fill(MARGIN, top, PAGE_WIDTH - MARGIN * 2.0, COMMENTS_HEIGHT, PANEL);
        self.text(
            MARGIN + 2.0,
            top + 5.0,
            "Ek Görüş ve Öneriler:",
            TextStyle::new(9.0, true, ACCENT),
        );

        let width = PAGE_WIDTH - 4.0 - MARGIN;
        let mut line_y = top + 10.0;
        // Lines past the panel are clipped.
        for line in wrap_text(text, chars_per_line(width, style.size)) {
            if line_y >= top + COMMENTS_HEIGHT - 2.0 {
                break;
            }
            self.text(MARGIN + 2.0, line_y, line, style);
            line_y += LINE_STEP;
        }
        self.y = top + COMMENTS_HEIGHT;
    }

    fn footer(&mut self) {
        self.centered(FOOTER_Y, FOOTER_TEXT, TextStyle::new(7.0, false, FAINT));
    }

    fn finish(self) -> DocumentLayout {
        DocumentLayout {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            pages: self.pages,
        }
    }
}

/// Approximate glyph capacity of a line, assuming half-em average glyphs.
fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    const MM_PER_PT: f32 = 0.3528;
    let glyph_mm = size_pt * MM_PER_PT * 0.5;
    ((width_mm / glyph_mm).floor() as usize).max(1)
}

/// Greedy word wrap; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        if current_len > 0 {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// `{name}_{studentId}_{YYYY-MM-DD}.{ext}` with the name reduced to a file-safe form.
pub fn document_file_name(answers: &AnswerMap, ctx: &ExportContext, extension: &str) -> String {
    let name = answers
        .text(NAME_KEY)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_FILE_STEM);
    let student_id = answers.text(STUDENT_ID_KEY).map(str::trim).unwrap_or("");
    format!(
        "{}_{}_{}.{}",
        sanitize_file_stem(name),
        sanitize_file_stem(student_id),
        iso_date(ctx.date),
        extension
    )
}

/// Whitespace runs become one `_`; any other non-alphanumeric character becomes `_`.
pub fn sanitize_file_stem(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        out.push(if ch.is_alphanumeric() { ch } else { '_' });
    }
    out
}

/// Optional capability that turns a layout into file bytes.
pub trait DocumentRenderer {
    fn extension(&self) -> &'static str;
    fn media_type(&self) -> &'static str;
    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, ExportError>;
}

/// Plain-text renderer: one line per distinct vertical offset, pages split by form feeds.
#[derive(Debug, Clone, Copy)]
pub struct TextDocumentRenderer {
    pub columns: usize,
}

impl Default for TextDocumentRenderer {
    fn default() -> Self {
        Self { columns: 96 }
    }
}

impl DocumentRenderer for TextDocumentRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn media_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
        let pages: Vec<String> = layout
            .pages
            .iter()
            .map(|page| self.render_page(page))
            .collect();
        Ok(pages.join("\u{c}\n").into_bytes())
    }
}

impl TextDocumentRenderer {
    fn render_page(&self, page: &Page) -> String {
        let mut texts: Vec<(f32, f32, &str, Align)> = page
            .elements
            .iter()
            .filter_map(|element| match element {
                Element::Text {
                    x, y, text, align, ..
                } => Some((*y, *x, text.as_str(), *align)),
                Element::Fill { .. } => None,
            })
            .collect();
        texts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

        let mut lines: Vec<String> = Vec::new();
        let mut current_y: Option<f32> = None;
        for (y, _, text, align) in texts {
            let line = match align {
                Align::Center => {
                    let pad = self.columns.saturating_sub(text.chars().count()) / 2;
                    format!("{}{}", " ".repeat(pad), text)
                }
                Align::Left => text.to_string(),
            };
            match (current_y, lines.last_mut()) {
                (Some(previous), Some(last)) if (previous - y).abs() < f32::EPSILON => {
                    last.push_str("    ");
                    last.push_str(&line);
                }
                _ => lines.push(line),
            }
            current_y = Some(y);
        }
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
