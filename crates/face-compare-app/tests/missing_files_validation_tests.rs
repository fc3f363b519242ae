//! Integration tests for submit validation with empty slots.

mod common;

use common::{RecordingTransport, workflow_with};
use face_compare_app::{AppConfig, SubmitStatus};
use face_compare_core::{ErrorCategory, MISSING_FILES_MESSAGE, Role, SubmissionPhase};

#[test]
fn missing_files_validation_tests_empty_slots_never_call_client() {
    let transport = RecordingTransport::answering(200, r#"{"confidence":0.9}"#);
    let (mut workflow, _events) = workflow_with(transport.clone(), &AppConfig::default());

    let SubmitStatus::Rejected(error) = workflow.submit() else {
        panic!("submit with empty slots must be rejected");
    };
    assert_eq!(error.category, ErrorCategory::Validation);
    assert_eq!(error.message, MISSING_FILES_MESSAGE);
    assert_eq!(workflow.controller().phase(), SubmissionPhase::Idle);
    assert_eq!(transport.calls(), 0);
}

#[test]
fn missing_files_validation_tests_one_slot_is_not_enough() {
    let transport = RecordingTransport::answering(200, r#"{"confidence":0.9}"#);
    let (mut workflow, events) = workflow_with(transport.clone(), &AppConfig::default());
    workflow.select(Role::After, "after").expect("after should load");
    workflow.wait_for_settled(&events).expect("preview should settle");

    assert!(!workflow.display().submit_enabled);
    assert!(matches!(workflow.submit(), SubmitStatus::Rejected(_)));

    let lines = workflow.display().render_lines();
    assert!(lines.iter().any(|line| line == &format!("Error: {MISSING_FILES_MESSAGE}")));
    assert_eq!(transport.calls(), 0);
}
