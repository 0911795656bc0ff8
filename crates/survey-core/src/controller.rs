use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::answers::{AnswerMap, AnswerValue, OTHER_SENTINEL};
use crate::catalog::QuestionCatalog;
use crate::export::{Deliver, ExportContext, ExportError, ExportKind, Exporter};
use crate::navigation::{NavigationController, NavigationError, Progress};
use crate::store::FormStateStore;
use crate::validate::{ValidationReport, validate_form};

/// Lifecycle of the form within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Editing,
    Submitting,
    Submitted,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// False when the completed snapshot could not be persisted.
    pub completed_saved: bool,
    /// Export actions now offered to the user.
    pub actions: Vec<ExportKind>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has {} validation issue(s)", .0.issues.len())]
    Invalid(ValidationReport),
    #[error("a submission is already in progress")]
    InFlight,
    #[error("exports are available only after a successful submission")]
    NotSubmitted,
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Orchestrates the live answer map: autosave on every change, section
/// navigation, validated submission and exports.
pub struct FormController {
    catalog: QuestionCatalog,
    store: FormStateStore,
    exporter: Exporter,
    navigation: NavigationController,
    answers: AnswerMap,
    phase: FormPhase,
}

impl FormController {
    /// Builds the controller and restores any autosaved answers.
    pub fn new(catalog: QuestionCatalog, store: FormStateStore, exporter: Exporter) -> Self {
        let answers = store.load_autosave().unwrap_or_default();
        if !answers.is_empty() {
            debug!(fields = answers.len(), "restored autosaved answers");
        }
        let navigation = NavigationController::for_catalog(&catalog);
        Self {
            catalog,
            store,
            exporter,
            navigation,
            answers,
            phase: FormPhase::Editing,
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn store(&self) -> &FormStateStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut FormStateStore {
        &mut self.store
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Field-change event. Stores the value, drops a companion free-text
    /// answer whose `other` option is no longer selected, and autosaves
    /// regardless of validity. Returns whether the autosave was written.
    pub fn set_answer(&mut self, key: &str, value: impl Into<AnswerValue>) -> bool {
        let value = value.into();
        if let Some(companion) = self.catalog.companion_key(key)
            && !value.contains(OTHER_SENTINEL)
            && self.answers.remove(companion).is_some()
        {
            debug!(key, companion, "cleared companion text");
        }
        self.answers.set(key, value);
        self.touch()
    }

    pub fn clear_answer(&mut self, key: &str) -> bool {
        self.answers.remove(key);
        if let Some(companion) = self.catalog.companion_key(key) {
            self.answers.remove(companion);
        }
        self.touch()
    }

    fn touch(&mut self) -> bool {
        if self.phase == FormPhase::Submitted {
            self.phase = FormPhase::Editing;
        }
        self.store.save_autosave(&self.answers)
    }

    pub fn validate(&self) -> ValidationReport {
        validate_form(&self.catalog, &self.answers)
    }

    pub fn progress(&self) -> Progress {
        self.navigation.progress()
    }

    pub fn next_section(&mut self) -> Result<Progress, NavigationError> {
        self.navigation.advance(&self.catalog, &self.answers)
    }

    pub fn previous_section(&mut self) -> Progress {
        self.navigation.retreat()
    }

    /// Validates the full form and enters [`FormPhase::Submitting`].
    pub fn begin_submit(&mut self) -> Result<(), SubmitError> {
        if self.phase == FormPhase::Submitting {
            warn!("submit requested while another submission is in flight");
            return Err(SubmitError::InFlight);
        }
        let report = self.validate();
        if !report.is_valid() {
            debug!(issues = report.issues.len(), "submission rejected");
            return Err(SubmitError::Invalid(report));
        }
        self.phase = FormPhase::Submitting;
        Ok(())
    }

    /// Persists the completed snapshot and exposes the export actions.
    /// Answers edited since [`Self::begin_submit`] are validated again; a
    /// failure returns the form to [`FormPhase::Editing`].
    pub fn complete_submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if self.phase != FormPhase::Submitting {
            return Err(SubmitError::NotSubmitted);
        }
        let report = self.validate();
        if !report.is_valid() {
            warn!(
                issues = report.issues.len(),
                "answers changed during submission; submission rejected"
            );
            self.phase = FormPhase::Editing;
            return Err(SubmitError::Invalid(report));
        }
        let completed_saved = self.store.save_completed(&self.answers);
        self.phase = FormPhase::Submitted;
        info!(completed_saved, "form submitted");
        Ok(SubmitOutcome {
            completed_saved,
            actions: self.available_actions(),
        })
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        self.begin_submit()?;
        self.complete_submit()
    }

    /// Export actions offered in the current phase.
    pub fn available_actions(&self) -> Vec<ExportKind> {
        if self.phase != FormPhase::Submitted {
            return Vec::new();
        }
        let mut actions = Vec::with_capacity(4);
        if self.exporter.has_renderer() {
            actions.push(ExportKind::Document);
        }
        actions.extend([ExportKind::Email, ExportKind::Share, ExportKind::Csv]);
        actions
    }

    pub fn export(&self, kind: ExportKind, target: &mut dyn Deliver) -> Result<(), SubmitError> {
        if self.phase != FormPhase::Submitted {
            return Err(SubmitError::NotSubmitted);
        }
        let ctx = ExportContext::today(self.store.clock());
        self.exporter
            .export(kind, &self.catalog, &self.answers, &ctx, target)?;
        Ok(())
    }

    /// Clears persisted state and starts over from an empty form.
    pub fn reset(&mut self) -> bool {
        self.answers = AnswerMap::new();
        self.navigation = NavigationController::for_catalog(&self.catalog);
        self.phase = FormPhase::Editing;
        self.store.clear()
    }
}
