//! Integration tests for shell command parsing.

use face_compare_app::{CommandError, ShellCommand};
use face_compare_core::Role;

#[test]
fn shell_command_tests_parses_every_verb() {
    assert_eq!(ShellCommand::parse("").unwrap(), ShellCommand::Empty);
    assert_eq!(ShellCommand::parse("submit").unwrap(), ShellCommand::Submit);
    assert_eq!(ShellCommand::parse("Reset").unwrap(), ShellCommand::Reset);
    assert_eq!(ShellCommand::parse("status").unwrap(), ShellCommand::Status);
    assert_eq!(ShellCommand::parse("health").unwrap(), ShellCommand::Health);
    assert_eq!(ShellCommand::parse("help").unwrap(), ShellCommand::Help);
    assert_eq!(ShellCommand::parse("quit").unwrap(), ShellCommand::Quit);
    assert_eq!(
        ShellCommand::parse("before ./faces/a.jpg").unwrap(),
        ShellCommand::Select {
            role: Role::Before,
            path: "./faces/a.jpg".to_string(),
        }
    );
}

#[test]
fn shell_command_tests_reports_bad_input() {
    assert!(matches!(
        ShellCommand::parse("upload a.jpg"),
        Err(CommandError::Unknown(verb)) if verb == "upload"
    ));
    assert!(matches!(
        ShellCommand::parse("after"),
        Err(CommandError::MissingArgument { command: "after", .. })
    ));
}
