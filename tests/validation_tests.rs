#![allow(clippy::unwrap_used, clippy::panic)]

use poll_scheduler_bot::database::models::PollSchedule;
use poll_scheduler_bot::utils::validation::{
    parse_schedule, validate_options, validate_question, validate_telegram_chat_id,
};

#[test]
fn test_question_with_unicode_is_counted_by_chars() {
    // 300 multibyte characters are fine; byte length is irrelevant
    let question = "é".repeat(300);
    assert!(validate_question(&question).is_ok());

    let too_long = "é".repeat(301);
    assert!(validate_question(&too_long).is_err());
}

#[test]
fn test_options_accept_unicode_labels() {
    let options = validate_options("🍕 Pizza, 🍣 Sushi, 🥗 Salad").unwrap();
    assert_eq!(options.len(), 3);
    assert_eq!(options[0], "🍕 Pizza");
}

#[test]
fn test_options_exact_bounds() {
    let two = validate_options("A, B").unwrap();
    assert_eq!(two.len(), 2);

    let ten = (0..10)
        .map(|i| format!("opt{i}"))
        .collect::<Vec<_>>()
        .join(",");
    assert_eq!(validate_options(&ten).unwrap().len(), 10);
}

#[test]
fn test_schedule_full_day_interval() {
    match parse_schedule("every 1440").unwrap() {
        PollSchedule::Interval { minutes } => assert_eq!(minutes, 1440),
        other => panic!("expected interval, got {other:?}"),
    }
}

#[test]
fn test_schedule_times_without_prefix() {
    match parse_schedule("09:00, 21:00").unwrap() {
        PollSchedule::Daily { times } => assert_eq!(times.len(), 2),
        other => panic!("expected daily times, got {other:?}"),
    }
}

#[test]
fn test_schedule_rejects_mixed_garbage() {
    assert!(parse_schedule("every lunch").is_err());
    assert!(parse_schedule("at noon").is_err());
    assert!(parse_schedule("-30").is_err());
    assert!(parse_schedule("10081").is_err());
}

#[test]
fn test_supergroup_chat_ids_pass_validation() {
    // The shapes Telegram actually produces
    assert!(validate_telegram_chat_id(123456789).is_ok());
    assert!(validate_telegram_chat_id(-987654).is_ok());
    assert!(validate_telegram_chat_id(-1001765432109).is_ok());
}
