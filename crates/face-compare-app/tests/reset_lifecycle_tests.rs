//! Integration tests for reset and resubmission.

mod common;

use common::{RecordingTransport, loaded_workflow};
use face_compare_app::{AppError, SubmitStatus};
use face_compare_core::{Role, SubmissionPhase};
use face_compare_session::SessionError;
use face_compare_ui::PreviewView;

#[test]
fn reset_lifecycle_tests_reset_after_success_empties_everything() {
    let transport = RecordingTransport::answering(200, r#"{"confidence":0.8}"#);
    let (mut workflow, events) = loaded_workflow(transport.clone());
    workflow.submit();
    workflow.wait_for_settled(&events).expect("comparison should settle");
    assert!(matches!(workflow.submit(), SubmitStatus::ResultShown));

    workflow.reset().expect("reset should work after success");

    let display = workflow.display();
    assert_eq!(display.phase, SubmissionPhase::Idle);
    assert_eq!(display.before.file_name, None);
    assert_eq!(display.after.preview, PreviewView::Empty);
    assert!(display.result.is_none());
    assert!(display.error.is_none());

    workflow.select(Role::Before, "before").expect("before should load");
    workflow.select(Role::After, "after").expect("after should load");
    assert!(matches!(workflow.submit(), SubmitStatus::Started { .. }));
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Submitting);
    assert_eq!(workflow.display().submit_label, "Processing...");

    workflow.wait_for_settled(&events).expect("second comparison should settle");
    assert_eq!(transport.calls(), 2);
}

#[test]
fn reset_lifecycle_tests_reset_after_failure_allows_resubmission() {
    let transport = RecordingTransport::answering(500, r#"{"error":"Model not loaded"}"#);
    let (mut workflow, events) = loaded_workflow(transport);
    workflow.submit();
    workflow.wait_for_settled(&events).expect("comparison should settle");
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Failed);

    workflow.reset().expect("reset should work after failure");
    assert!(workflow.controller().error().is_none());
    assert!(!workflow.controller().has_both_files());
    assert!(workflow.display().error.is_none());

    workflow.select(Role::Before, "before").expect("before should load");
    workflow.select(Role::After, "after").expect("after should load");
    assert!(matches!(workflow.submit(), SubmitStatus::Started { .. }));
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Submitting);

    workflow.wait_for_settled(&events).expect("second comparison should settle");
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Failed);
}

#[test]
fn reset_lifecycle_tests_reset_is_refused_while_submitting() {
    let transport = RecordingTransport::answering(200, r#"{"confidence":0.8}"#);
    let (mut workflow, events) = loaded_workflow(transport);
    workflow.submit();

    assert!(matches!(
        workflow.reset(),
        Err(AppError::Session(SessionError::SubmissionInFlight))
    ));
    assert!(matches!(workflow.submit(), SubmitStatus::AlreadyInFlight));

    workflow.wait_for_settled(&events).expect("comparison should settle");
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Succeeded);
}
