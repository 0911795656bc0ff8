use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::answers::AnswerMap;
use crate::catalog::QuestionCatalog;
use crate::validate::{ValidationReport, validate_section};

/// Position indicator over the form's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub index: usize,
    pub total: usize,
}

impl Progress {
    /// `(index + 1) / total`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.index + 1) as f64 / self.total as f64
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn label(&self) -> String {
        format!("Bölüm {} / {}", self.index + 1, self.total)
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("section {index} has {} unanswered or invalid entries", .report.issues.len())]
    SectionIncomplete {
        index: usize,
        report: ValidationReport,
    },
}

/// Tracks the active section; forward moves are gated on the current section validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationController {
    index: usize,
    total: usize,
}

impl NavigationController {
    /// `total` is clamped to at least one section.
    pub fn new(total: usize) -> Self {
        Self {
            index: 0,
            total: total.max(1),
        }
    }

    pub fn for_catalog(catalog: &QuestionCatalog) -> Self {
        Self::new(catalog.section_count())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    pub fn progress(&self) -> Progress {
        Progress {
            index: self.index,
            total: self.total,
        }
    }

    /// Moves forward when the current section passes validation. The index
    /// stays put on failure and saturates at the last section.
    pub fn advance(
        &mut self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
    ) -> Result<Progress, NavigationError> {
        let report = validate_section(catalog, self.index, answers);
        if !report.is_valid() {
            debug!(index = self.index, issues = report.issues.len(), "advance blocked");
            return Err(NavigationError::SectionIncomplete {
                index: self.index,
                report,
            });
        }
        self.index = (self.index + 1).min(self.total - 1);
        debug!(index = self.index, "advanced section");
        Ok(self.progress())
    }

    /// Moves back one section without validation, stopping at the first.
    pub fn retreat(&mut self) -> Progress {
        self.index = self.index.saturating_sub(1);
        debug!(index = self.index, "retreated section");
        self.progress()
    }

    /// Advances repeatedly until blocked or on the last section.
    pub fn advance_while_valid(
        &mut self,
        catalog: &QuestionCatalog,
        answers: &AnswerMap,
    ) -> Result<Progress, NavigationError> {
        while !self.is_last() {
            self.advance(catalog, answers)?;
        }
        Ok(self.progress())
    }
}
