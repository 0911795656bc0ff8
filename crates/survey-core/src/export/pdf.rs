use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::export::ExportError;
use crate::export::document::{Align, DocumentLayout, DocumentRenderer, Element, Page, Rgb};

const PT_PER_MM: f32 = 72.0 / 25.4;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

// Object ids; pages and their content streams follow the fonts in pairs.
const CATALOG_ID: i32 = 1;
const PAGE_TREE_ID: i32 = 2;
const REGULAR_FONT_ID: i32 = 3;
const BOLD_FONT_ID: i32 = 4;
const FIRST_PAGE_ID: i32 = 5;

/// Code points of WinAnsi that carry Turkish letters instead, as in Windows-1254.
const TURKISH_SLOTS: [(char, u8, Name<'static>); 6] = [
    ('Ğ', 0xD0, Name(b"Gbreve")),
    ('İ', 0xDD, Name(b"Idotaccent")),
    ('Ş', 0xDE, Name(b"Scedilla")),
    ('ğ', 0xF0, Name(b"gbreve")),
    ('ı', 0xFD, Name(b"dotlessi")),
    ('ş', 0xFE, Name(b"scedilla")),
];

/// Helvetica advance widths for ' '..='~', in thousandths of an em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const FALLBACK_WIDTH: u16 = 556;

/// A4 PDF renderer drawing the layout with the standard Helvetica faces.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentRenderer;

impl DocumentRenderer for PdfDocumentRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn media_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
        let mut pdf = Pdf::new();
        let page_ids: Vec<(Ref, Ref)> = (0..layout.pages.len() as i32)
            .map(|index| {
                let page = FIRST_PAGE_ID + index * 2;
                (Ref::new(page), Ref::new(page + 1))
            })
            .collect();

        let page_tree = Ref::new(PAGE_TREE_ID);
        let regular = Ref::new(REGULAR_FONT_ID);
        let bold = Ref::new(BOLD_FONT_ID);

        pdf.catalog(Ref::new(CATALOG_ID)).pages(page_tree);
        pdf.pages(page_tree)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);
        write_font(&mut pdf, regular, b"Helvetica");
        write_font(&mut pdf, bold, b"Helvetica-Bold");

        let media_box = Rect::new(0.0, 0.0, mm(layout.width), mm(layout.height));
        for (page, (page_id, content_id)) in layout.pages.iter().zip(&page_ids) {
            let mut writer = pdf.page(*page_id);
            writer.media_box(media_box);
            writer.parent(page_tree);
            writer.contents(*content_id);
            writer
                .resources()
                .fonts()
                .pair(REGULAR, regular)
                .pair(BOLD, bold);
            writer.finish();

            let content = page_content(page, layout.height);
            pdf.stream(*content_id, &content);
        }
        Ok(pdf.finish())
    }
}

fn write_font(pdf: &mut Pdf, id: Ref, base: &'static [u8]) {
    let mut font = pdf.type1_font(id);
    font.base_font(Name(base));
    let mut encoding = font.encoding_custom();
    encoding.base_encoding(Name(b"WinAnsiEncoding"));
    let mut differences = encoding.differences();
    for (_, code, glyph) in TURKISH_SLOTS {
        differences.consecutive(code, [glyph]);
    }
}

fn page_content(page: &Page, page_height: f32) -> Vec<u8> {
    let mut content = Content::new();
    for element in &page.elements {
        match element {
            Element::Fill {
                x,
                y,
                width,
                height,
                color,
            } => {
                set_fill(&mut content, *color);
                content.rect(
                    mm(*x),
                    mm(page_height - y - height),
                    mm(*width),
                    mm(*height),
                );
                content.fill_nonzero();
            }
            Element::Text {
                x,
                y,
                text,
                style,
                align,
            } => {
                let encoded = encode_text(text);
                let left = match align {
                    Align::Left => mm(*x),
                    Align::Center => mm(*x) - text_width(&encoded, style.size) / 2.0,
                };
                set_fill(&mut content, style.color);
                content.begin_text();
                content.set_font(if style.bold { BOLD } else { REGULAR }, style.size);
                content.next_line(left, mm(page_height - y));
                content.show(Str(&encoded));
                content.end_text();
            }
        }
    }
    content.finish().to_vec()
}

fn set_fill(content: &mut Content, Rgb(r, g, b): Rgb) {
    content.set_fill_rgb(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
}

fn mm(value: f32) -> f32 {
    value * PT_PER_MM
}

/// Single-byte encoding matching the font dictionaries; unmapped characters become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            if let Some((_, code, _)) = TURKISH_SLOTS.iter().find(|(turkish, ..)| *turkish == ch) {
                return *code;
            }
            match u32::from(ch) {
                0x20..=0x7E => ch as u8,
                code @ 0xA0..=0xFF
                    if !TURKISH_SLOTS.iter().any(|(_, slot, _)| u32::from(*slot) == code) =>
                {
                    code as u8
                }
                _ => b'?',
            }
        })
        .collect()
}

/// Approximate rendered width in points.
fn text_width(encoded: &[u8], size: f32) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&byte| {
            let width = match byte {
                0x20..=0x7E => HELVETICA_WIDTHS[usize::from(byte - 0x20)],
                _ => FALLBACK_WIDTH,
            };
            u32::from(width)
        })
        .sum();
    units as f32 / 1000.0 * size
}
