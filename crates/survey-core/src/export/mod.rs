pub mod deliver;
pub mod document;
pub mod message;
pub mod pdf;
pub mod resolve;
pub mod table;

use thiserror::Error;
use time::Date;
use tracing::{debug, error};

use crate::answers::AnswerMap;
use crate::catalog::QuestionCatalog;
use crate::clock::Clock;

pub use deliver::{Deliver, Delivery};
pub use document::{DocumentLayout, DocumentRenderer, TextDocumentRenderer, document_file_name};
pub use message::{compose_uri, email_subject, long_text, share_uri, short_text};
pub use pdf::PdfDocumentRenderer;
pub use resolve::{PLACEHOLDER, personal_value, resolve_answer};
pub use table::{CSV_HEADERS, csv_bytes, csv_file_name};

/// Errors raised while producing or delivering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document renderer is not available")]
    RendererUnavailable,
    #[error("document rendering failed: {0}")]
    Render(String),
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Output forms an export can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Paginated document saved as a file.
    Document,
    /// Long-form text opened in a message composer.
    Email,
    /// Short-form text opened through a share link.
    Share,
    /// Single-row tabular file.
    Csv,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Document => "document",
            ExportKind::Email => "email",
            ExportKind::Share => "share",
            ExportKind::Csv => "csv",
        }
    }
}

/// Values shared by every artifact of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportContext {
    pub date: Date,
}

impl ExportContext {
    pub fn on(date: Date) -> Self {
        Self { date }
    }

    pub fn today(clock: &dyn Clock) -> Self {
        Self::on(clock.today())
    }
}

/// Turns answers into deliverable artifacts.
///
/// The document renderer is an optional capability decided at construction;
/// without one, document exports fail with [`ExportError::RendererUnavailable`].
pub struct Exporter {
    renderer: Option<Box<dyn DocumentRenderer>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// Exporter with the A4 PDF document renderer installed.
    pub fn new() -> Self {
        Self::with_renderer(PdfDocumentRenderer)
    }

    pub fn with_renderer(renderer: impl DocumentRenderer + 'static) -> Self {
        Self {
            renderer: Some(Box::new(renderer)),
        }
    }

    pub fn without_renderer() -> Self {
        Self { renderer: None }
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn document(
        &self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
    ) -> Result<Delivery, ExportError> {
        let Some(renderer) = self.renderer.as_deref() else {
            error!("document export requested but no renderer is installed");
            return Err(ExportError::RendererUnavailable);
        };
        let layout = DocumentLayout::build(catalog, answers, ctx);
        let bytes = renderer.render(&layout)?;
        Ok(Delivery::File {
            name: document_file_name(answers, ctx, renderer.extension()),
            media_type: renderer.media_type(),
            bytes,
        })
    }

    pub fn email(
        &self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
    ) -> Delivery {
        let body = long_text(catalog, answers, ctx);
        Delivery::Compose {
            uri: compose_uri(&email_subject(answers), &body),
        }
    }

    pub fn share(
        &self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
    ) -> Delivery {
        Delivery::Share {
            uri: share_uri(&short_text(catalog, answers, ctx)),
        }
    }

    pub fn csv(
        &self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
    ) -> Result<Delivery, ExportError> {
        Ok(Delivery::File {
            name: csv_file_name(ctx),
            media_type: "text/csv; charset=utf-8",
            bytes: csv_bytes(catalog, answers, ctx)?,
        })
    }

    pub fn prepare(
        &self,
        kind: ExportKind,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
    ) -> Result<Delivery, ExportError> {
        match kind {
            ExportKind::Document => self.document(catalog, answers, ctx),
            ExportKind::Email => Ok(self.email(catalog, answers, ctx)),
            ExportKind::Share => Ok(self.share(catalog, answers, ctx)),
            ExportKind::Csv => self.csv(catalog, answers, ctx),
        }
    }

    /// Prepares the artifact and hands it to `target`.
    pub fn export(
        &self,
        kind: ExportKind,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
        ctx: &ExportContext,
        target: &mut dyn Deliver,
    ) -> Result<(), ExportError> {
        let delivery = self.prepare(kind, catalog, answers, ctx)?;
        debug!(kind = kind.as_str(), "delivering export");
        target.deliver(delivery)
    }
}
