#![allow(clippy::panic)]

use poll_scheduler_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[test]
fn test_help_command_parsing() {
    let result = Command::parse("/help", "testbot");
    assert!(matches!(result, Ok(Command::Help)));
}

#[test]
fn test_start_command_parsing() {
    let result = Command::parse("/start", "testbot");
    assert!(matches!(result, Ok(Command::Start)));
}

#[test]
fn test_createpoll_command_parsing() {
    let result = Command::parse("/createpoll", "testbot");
    assert!(matches!(result, Ok(Command::CreatePoll)));
}

#[test]
fn test_cancel_command_parsing() {
    let result = Command::parse("/cancel", "testbot");
    assert!(matches!(result, Ok(Command::Cancel)));
}

#[test]
fn test_listpolls_command_parsing() {
    let result = Command::parse("/listpolls", "testbot");
    assert!(matches!(result, Ok(Command::ListPolls)));
}

#[test]
fn test_dashboard_command_parsing() {
    let result = Command::parse("/dashboard", "testbot");
    assert!(matches!(result, Ok(Command::Dashboard)));
}

#[test]
fn test_deletepoll_command_with_id() {
    match Command::parse("/deletepoll 5", "testbot") {
        Ok(Command::DeletePoll { id }) => assert_eq!(id, 5),
        other => panic!("Expected DeletePoll, got {other:?}"),
    }
}

#[test]
fn test_deletepoll_command_without_id_fails() {
    assert!(Command::parse("/deletepoll", "testbot").is_err());
}

#[test]
fn test_deletepoll_command_with_garbage_id_fails() {
    assert!(Command::parse("/deletepoll five", "testbot").is_err());
}

#[test]
fn test_sendnow_command_with_id() {
    match Command::parse("/sendnow 12", "testbot") {
        Ok(Command::SendNow { id }) => assert_eq!(id, 12),
        other => panic!("Expected SendNow, got {other:?}"),
    }
}

#[test]
fn test_pause_and_resume_commands() {
    match Command::parse("/pausepoll 3", "testbot") {
        Ok(Command::PausePoll { id }) => assert_eq!(id, 3),
        other => panic!("Expected PausePoll, got {other:?}"),
    }
    match Command::parse("/resumepoll 3", "testbot") {
        Ok(Command::ResumePoll { id }) => assert_eq!(id, 3),
        other => panic!("Expected ResumePoll, got {other:?}"),
    }
}

#[test]
fn test_results_command_with_id() {
    match Command::parse("/results 8", "testbot") {
        Ok(Command::Results { id }) => assert_eq!(id, 8),
        other => panic!("Expected Results, got {other:?}"),
    }
}

#[test]
fn test_command_with_bot_mention() {
    let result = Command::parse("/listpolls@testbot", "testbot");
    assert!(matches!(result, Ok(Command::ListPolls)));
}

#[test]
fn test_unknown_command_fails() {
    assert!(Command::parse("/doesnotexist", "testbot").is_err());
}

#[test]
fn test_descriptions_mention_core_commands() {
    let descriptions = Command::descriptions().to_string();
    assert!(descriptions.contains("/createpoll"));
    assert!(descriptions.contains("/listpolls"));
    assert!(descriptions.contains("/deletepoll"));
    assert!(descriptions.contains("/sendnow"));
    assert!(descriptions.contains("/results"));
}
