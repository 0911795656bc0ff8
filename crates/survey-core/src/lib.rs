#![allow(missing_docs)]

pub mod answers;
pub mod backup;
pub mod catalog;
pub mod clock;
pub mod controller;
pub mod export;
pub mod navigation;
pub mod store;
pub mod validate;

pub use answers::{AnswerMap, AnswerValue, OTHER_SENTINEL};
pub use backup::{
    BackupDocument, BackupError, BackupSummary, apply_backup, backup_file_name, collect_backup,
    export_backup, import_backup,
};
pub use catalog::{QuestionCatalog, QuestionDescriptor, QuestionKind, Section};
pub use clock::{Clock, FixedClock, SystemClock, display_date, iso_date};
pub use controller::{FormController, FormPhase, SubmitError, SubmitOutcome};
pub use export::{
    Deliver, Delivery, DocumentLayout, DocumentRenderer, ExportContext, ExportError, ExportKind,
    Exporter, PdfDocumentRenderer, TextDocumentRenderer, personal_value, resolve_answer,
};
pub use navigation::{NavigationController, NavigationError, Progress};
pub use store::{
    AutosaveSnapshot, CompletedSnapshot, DEFAULT_NAMESPACE, FormStateStore, MemoryBackend,
    SNAPSHOT_VERSION, Settings, StorageBackend, StorageInfo, StoreError,
};
pub use validate::{
    FieldCheck, FieldIssue, FieldKind, IssueLevel, ValidationReport, validate_form,
    validate_section,
};
