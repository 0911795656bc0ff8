use time::OffsetDateTime;

use survey_core::{
    AnswerMap, Delivery, ExportKind, Exporter, FixedClock, FormController, FormPhase,
    FormStateStore, QuestionCatalog, SubmitError,
};

fn store() -> FormStateStore {
    let now = OffsetDateTime::from_unix_timestamp(1_792_404_000).expect("valid timestamp");
    FormStateStore::in_memory().with_clock(FixedClock(now))
}

fn controller() -> FormController {
    FormController::new(QuestionCatalog::student_intake(), store(), Exporter::new())
}

fn fill(controller: &mut FormController) {
    controller.set_answer("name", "Ayşe Yılmaz");
    controller.set_answer("studentNo", "20231234");
    controller.set_answer("email", "ayse@example.com");
    for key in [
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
    ] {
        controller.set_answer(key, "a");
    }
}

#[test]
fn every_change_is_autosaved() {
    let mut controller = controller();
    assert!(controller.set_answer("name", "Ali"));
    assert_eq!(
        controller.store().load_autosave(),
        Some(controller.answers().clone())
    );

    // Invalid values are saved too.
    assert!(controller.set_answer("email", "not-an-email"));
    let saved = controller.store().load_autosave().expect("autosave");
    assert_eq!(saved.text("email"), Some("not-an-email"));
}

#[test]
fn autosave_is_restored_on_start() {
    let mut store = store();
    let mut answers = AnswerMap::new();
    answers.set("name", "Taslak");
    store.save_autosave(&answers);

    let controller = FormController::new(QuestionCatalog::student_intake(), store, Exporter::new());
    assert_eq!(controller.answers().text("name"), Some("Taslak"));
    assert_eq!(controller.phase(), FormPhase::Editing);
}

#[test]
fn dropping_other_clears_companion_text() {
    let mut controller = controller();
    controller.set_answer("reason", "other");
    controller.set_answer("reason_other", "Ailemin önerisi");
    assert!(controller.answers().contains_key("reason_other"));

    controller.set_answer("reason", "a");
    assert!(!controller.answers().contains_key("reason_other"));
    let saved = controller.store().load_autosave().expect("autosave");
    assert!(!saved.contains_key("reason_other"));
}

#[test]
fn invalid_submit_reports_issues_and_writes_nothing() {
    let mut controller = controller();
    controller.set_answer("name", "Ali");
    let err = controller.submit().expect_err("incomplete form");
    let SubmitError::Invalid(report) = err else {
        panic!("expected validation failure");
    };
    assert!(report.keys().any(|key| key == "studentNo"));
    assert_eq!(controller.phase(), FormPhase::Editing);
    assert!(controller.store().load_completed().is_none());
    assert!(controller.available_actions().is_empty());
}

#[test]
fn valid_submit_persists_and_offers_exports() {
    let mut controller = controller();
    fill(&mut controller);
    let outcome = controller.submit().expect("valid submit");
    assert!(outcome.completed_saved);
    assert_eq!(
        outcome.actions,
        vec![
            ExportKind::Document,
            ExportKind::Email,
            ExportKind::Share,
            ExportKind::Csv
        ]
    );
    assert_eq!(controller.phase(), FormPhase::Submitted);

    let snapshot = controller
        .store()
        .completed_snapshot()
        .expect("completed snapshot");
    assert_eq!(snapshot.completed_at, "2026-10-19T10:00:00Z");
    assert_eq!(&snapshot.data, controller.answers());
}

#[test]
fn second_submit_while_in_flight_is_rejected() {
    let mut controller = controller();
    fill(&mut controller);
    controller.begin_submit().expect("first submit");
    assert_eq!(controller.phase(), FormPhase::Submitting);
    assert!(matches!(
        controller.begin_submit(),
        Err(SubmitError::InFlight)
    ));
    controller.complete_submit().expect("complete");
    assert_eq!(controller.phase(), FormPhase::Submitted);
}

#[test]
fn edits_during_submission_are_validated_again() {
    let mut controller = controller();
    fill(&mut controller);
    controller.begin_submit().expect("first submit");
    controller.set_answer("email", "not-an-email");
    controller.set_answer("reason", "other");

    let Err(SubmitError::Invalid(report)) = controller.complete_submit() else {
        panic!("edited answers must be rejected");
    };
    assert_eq!(
        report.keys().collect::<Vec<_>>(),
        vec!["email", "reason_other"]
    );
    assert_eq!(controller.phase(), FormPhase::Editing);
    assert!(controller.store().completed_snapshot().is_none());
    assert!(controller.available_actions().is_empty());
}

#[test]
fn exports_require_submission() {
    let mut controller = controller();
    fill(&mut controller);
    let mut sink: Vec<Delivery> = Vec::new();
    assert!(matches!(
        controller.export(ExportKind::Csv, &mut sink),
        Err(SubmitError::NotSubmitted)
    ));
    assert!(matches!(
        controller.complete_submit(),
        Err(SubmitError::NotSubmitted)
    ));

    controller.submit().expect("submit");
    controller
        .export(ExportKind::Csv, &mut sink)
        .expect("csv export");
    controller
        .export(ExportKind::Document, &mut sink)
        .expect("document export");
    let names: Vec<&str> = sink.iter().filter_map(Delivery::file_name).collect();
    assert_eq!(
        names,
        vec![
            "form_data_2026-10-19.csv",
            "Ayşe_Yılmaz_20231234_2026-10-19.pdf"
        ]
    );
}

#[test]
fn editing_after_submit_reopens_the_form() {
    let mut controller = controller();
    fill(&mut controller);
    controller.submit().expect("submit");
    controller.set_answer("career", "b");
    assert_eq!(controller.phase(), FormPhase::Editing);
    assert!(controller.available_actions().is_empty());
}

#[test]
fn without_renderer_document_action_is_hidden() {
    let mut controller = FormController::new(
        QuestionCatalog::student_intake(),
        store(),
        Exporter::without_renderer(),
    );
    fill(&mut controller);
    let outcome = controller.submit().expect("submit");
    assert_eq!(
        outcome.actions,
        vec![ExportKind::Email, ExportKind::Share, ExportKind::Csv]
    );
}

#[test]
fn section_navigation_goes_through_controller() {
    let mut controller = controller();
    assert!(controller.next_section().is_err());
    fill(&mut controller);
    assert_eq!(controller.next_section().expect("advance").index, 1);
    assert_eq!(controller.previous_section().index, 0);
    assert_eq!(controller.progress().total, 6);
}

#[test]
fn reset_clears_everything() {
    let mut controller = controller();
    fill(&mut controller);
    controller.submit().expect("submit");
    assert!(controller.reset());
    assert!(controller.answers().is_empty());
    assert_eq!(controller.phase(), FormPhase::Editing);
    let info = controller.store().storage_info();
    assert!(!info.has_autosave && !info.has_completed);
}
