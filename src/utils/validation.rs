use anyhow::{anyhow, Result};

use crate::database::models::PollSchedule;
use crate::utils::datetime::parse_time_of_day;

/// Telegram caps poll questions at 300 characters.
const MAX_QUESTION_LEN: usize = 300;
/// Telegram caps poll option labels at 100 characters.
const MAX_OPTION_LEN: usize = 100;
const MAX_OPTIONS: usize = 10;
const MIN_OPTIONS: usize = 2;
/// One week, in minutes.
const MAX_INTERVAL_MINUTES: i64 = 10_080;
const MAX_SCHEDULE_TIMES: usize = 8;

pub fn validate_question(question: &str) -> Result<()> {
    let question = question.trim();

    if question.is_empty() {
        return Err(anyhow!("Question cannot be empty"));
    }

    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(anyhow!(
            "Question cannot be longer than {MAX_QUESTION_LEN} characters"
        ));
    }

    Ok(())
}

/// Splits a comma-separated option list and checks Telegram's poll limits.
pub fn validate_options(input: &str) -> Result<Vec<String>> {
    let options: Vec<String> = input
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(anyhow!("A poll needs at least {MIN_OPTIONS} options"));
    }

    if options.len() > MAX_OPTIONS {
        return Err(anyhow!("A poll can have at most {MAX_OPTIONS} options"));
    }

    for option in &options {
        if option.chars().count() > MAX_OPTION_LEN {
            return Err(anyhow!(
                "Option '{option}' is too long (max {MAX_OPTION_LEN} characters)"
            ));
        }
    }

    Ok(options)
}

pub fn validate_interval_minutes(minutes: i64) -> Result<()> {
    if minutes < 1 {
        return Err(anyhow!("Interval must be at least 1 minute"));
    }

    if minutes > MAX_INTERVAL_MINUTES {
        return Err(anyhow!(
            "Interval cannot be longer than {MAX_INTERVAL_MINUTES} minutes (one week)"
        ));
    }

    Ok(())
}

/// Parses the wizard's schedule step: either an interval in minutes
/// (`90`, `every 90`) or daily times (`at 09:00, 18:30` or `09:00, 18:30`).
pub fn parse_schedule(input: &str) -> Result<PollSchedule> {
    let mut text = input.trim();

    if text.is_empty() {
        return Err(anyhow!("Schedule cannot be empty"));
    }

    for prefix in ["every ", "Every ", "at ", "At "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim();
            break;
        }
    }

    if text.contains(':') {
        let mut times = Vec::new();
        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            times.push(parse_time_of_day(part)?);
        }

        if times.is_empty() {
            return Err(anyhow!("Provide at least one time, e.g. 'at 09:00'"));
        }

        if times.len() > MAX_SCHEDULE_TIMES {
            return Err(anyhow!(
                "At most {MAX_SCHEDULE_TIMES} daily times are supported"
            ));
        }

        times.sort();
        times.dedup();
        return Ok(PollSchedule::Daily { times });
    }

    let minutes: i64 = text
        .parse()
        .map_err(|_| anyhow!("Expected minutes (e.g. '90') or times (e.g. 'at 09:00')"))?;
    validate_interval_minutes(minutes)?;

    Ok(PollSchedule::Interval { minutes })
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Positive IDs should be within reasonable range for user chats (up to 2^31-1)
    if chat_id > 2147483647 {
        return Err(anyhow!("Invalid user chat ID range"));
    }

    // Negative IDs can be:
    // - Group chats: small negative numbers like -12345 (up to around -2^31)
    // - Supergroups: very large negative numbers starting around -1000000000000
    // Reject extremely large negative numbers beyond Telegram's known ranges
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_validate_question_valid() {
        assert!(validate_question("Lunch today?").is_ok());
        assert!(validate_question("  Trimmed?  ").is_ok());
        assert!(validate_question(&"q".repeat(300)).is_ok());
    }

    #[test]
    fn test_validate_question_invalid() {
        assert!(validate_question("").is_err());
        assert!(validate_question("   ").is_err());
        assert!(validate_question(&"q".repeat(301)).is_err());
    }

    #[test]
    fn test_validate_options_valid() {
        let options = validate_options("Yes, No, Maybe").unwrap();
        assert_eq!(options, vec!["Yes", "No", "Maybe"]);
    }

    #[test]
    fn test_validate_options_trims_and_skips_empty() {
        let options = validate_options(" A ,, B ,").unwrap();
        assert_eq!(options, vec!["A", "B"]);
    }

    #[test]
    fn test_validate_options_too_few() {
        assert!(validate_options("OnlyOne").is_err());
        assert!(validate_options("").is_err());
        assert!(validate_options(",,,").is_err());
    }

    #[test]
    fn test_validate_options_too_many() {
        let many = (0..11).map(|i| format!("opt{i}")).collect::<Vec<_>>().join(",");
        assert!(validate_options(&many).is_err());
    }

    #[test]
    fn test_validate_options_label_too_long() {
        let long = format!("A, {}", "x".repeat(101));
        assert!(validate_options(&long).is_err());
    }

    #[test]
    fn test_validate_interval_minutes() {
        assert!(validate_interval_minutes(1).is_ok());
        assert!(validate_interval_minutes(1440).is_ok());
        assert!(validate_interval_minutes(10_080).is_ok());
        assert!(validate_interval_minutes(0).is_err());
        assert!(validate_interval_minutes(-5).is_err());
        assert!(validate_interval_minutes(10_081).is_err());
    }

    #[test]
    fn test_parse_schedule_interval() {
        match parse_schedule("90").unwrap() {
            PollSchedule::Interval { minutes } => assert_eq!(minutes, 90),
            other => panic!("expected interval, got {other:?}"),
        }
        match parse_schedule("every 1440").unwrap() {
            PollSchedule::Interval { minutes } => assert_eq!(minutes, 1440),
            other => panic!("expected interval, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_schedule_daily_times() {
        match parse_schedule("at 09:00, 18:30").unwrap() {
            PollSchedule::Daily { times } => {
                assert_eq!(
                    times,
                    vec![
                        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                        NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
                    ]
                );
            }
            other => panic!("expected daily times, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_schedule_sorts_and_dedups_times() {
        match parse_schedule("18:00, 09:00, 18:00").unwrap() {
            PollSchedule::Daily { times } => {
                assert_eq!(
                    times,
                    vec![
                        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                    ]
                );
            }
            other => panic!("expected daily times, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_schedule_invalid() {
        assert!(parse_schedule("").is_err());
        assert!(parse_schedule("soon").is_err());
        assert!(parse_schedule("at 25:00").is_err());
        assert!(parse_schedule("0").is_err());
    }

    #[test]
    fn test_validate_telegram_chat_id_valid() {
        // Private chat (positive)
        assert!(validate_telegram_chat_id(12345).is_ok());
        // Group chat (negative)
        assert!(validate_telegram_chat_id(-987654321).is_ok());
        // Supergroup (very negative)
        assert!(validate_telegram_chat_id(-1001234567890).is_ok());
    }

    #[test]
    fn test_validate_telegram_chat_id_invalid() {
        assert!(validate_telegram_chat_id(0).is_err());
        assert!(validate_telegram_chat_id(3000000000).is_err());
        assert!(validate_telegram_chat_id(-3000000000000).is_err());
    }
}
