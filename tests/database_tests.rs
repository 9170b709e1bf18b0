#![allow(clippy::unwrap_used, clippy::panic)]

use anyhow::Result;
use chrono::NaiveTime;
use poll_scheduler_bot::database::connection::DatabaseManager;
use poll_scheduler_bot::database::models::{Delivery, NewPoll, Poll, PollSchedule, Vote};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

fn interval_poll(chat_id: i64, question: &str, minutes: i64) -> NewPoll {
    NewPoll {
        chat_id,
        question: question.to_string(),
        options: vec!["Yes".to_string(), "No".to_string()],
        schedule: PollSchedule::Interval { minutes },
        pinned: false,
        delete_previous: false,
        creator_id: Some(100),
    }
}

#[tokio::test]
async fn test_poll_creation_and_retrieval() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let poll = Poll::create(&db, interval_poll(-1001, "Lunch today?", 1440)).await?;

    assert!(poll.id > 0);
    assert_eq!(poll.chat_id, -1001);
    assert_eq!(poll.question, "Lunch today?");
    assert_eq!(poll.option_list()?, vec!["Yes", "No"]);
    assert_eq!(poll.interval_minutes, Some(1440));
    assert_eq!(poll.schedule_times, None);
    assert!(!poll.pinned);
    assert!(!poll.delete_previous);
    assert!(poll.active);
    assert_eq!(poll.last_sent, 0);
    assert_eq!(poll.last_message_id, None);
    assert_eq!(poll.creator_id, Some(100));

    let found = Poll::find_by_id(&db, poll.id).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().question, "Lunch today?");

    Ok(())
}

#[tokio::test]
async fn test_poll_not_found() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let result = Poll::find_by_id(&db, 9999).await?;
    assert!(result.is_none());

    Ok(())
}

#[tokio::test]
async fn test_poll_with_daily_schedule_round_trips() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let times = vec![
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
    ];
    let new_poll = NewPoll {
        chat_id: -42,
        question: "Standup attendance?".to_string(),
        options: vec!["In".to_string(), "Out".to_string()],
        schedule: PollSchedule::Daily {
            times: times.clone(),
        },
        pinned: true,
        delete_previous: true,
        creator_id: None,
    };

    let poll = Poll::create(&db, new_poll).await?;
    assert_eq!(poll.interval_minutes, None);
    assert!(poll.pinned);
    assert!(poll.delete_previous);

    match poll.schedule()? {
        PollSchedule::Daily { times: decoded } => assert_eq!(decoded, times),
        other => panic!("expected daily schedule, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_list_by_chat_is_chat_scoped() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    Poll::create(&db, interval_poll(-1, "A?", 60)).await?;
    Poll::create(&db, interval_poll(-1, "B?", 60)).await?;
    Poll::create(&db, interval_poll(-2, "C?", 60)).await?;

    let polls = Poll::list_by_chat(&db, -1).await?;
    assert_eq!(polls.len(), 2);
    assert_eq!(polls[0].question, "A?");
    assert_eq!(polls[1].question, "B?");

    let other = Poll::list_by_chat(&db, -2).await?;
    assert_eq!(other.len(), 1);

    assert!(Poll::list_by_chat(&db, -3).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_mark_sent_updates_tracking_columns() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;
    Poll::mark_sent(&db, poll.id, 1_700_000_000, 555).await?;

    let poll = Poll::find_by_id(&db, poll.id).await?.unwrap();
    assert_eq!(poll.last_sent, 1_700_000_000);
    assert_eq!(poll.last_message_id, Some(555));

    Ok(())
}

#[tokio::test]
async fn test_set_active_pause_and_resume() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    let affected = Poll::set_active(&db, poll.id, false).await?;
    assert_eq!(affected, 1);
    let paused = Poll::find_by_id(&db, poll.id).await?.unwrap();
    assert!(!paused.active);
    assert!(Poll::list_active(&db).await?.is_empty());

    Poll::set_active(&db, poll.id, true).await?;
    assert_eq!(Poll::list_active(&db).await?.len(), 1);

    // Unknown id touches nothing
    assert_eq!(Poll::set_active(&db, 9999, false).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_delete_cascades_to_votes_and_deliveries() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;
    Delivery::create(&db, poll.id, "tg-poll-1", poll.chat_id, 10).await?;
    Vote::replace(&db, poll.id, 7, Some("alice".to_string()), &[0]).await?;

    let affected = Poll::delete(&db, poll.id).await?;
    assert_eq!(affected, 1);

    assert!(Vote::find_by_poll(&db, poll.id).await?.is_empty());
    assert_eq!(Delivery::find_poll_id(&db, "tg-poll-1").await?, None);

    Ok(())
}

#[tokio::test]
async fn test_vote_replace_overwrites_previous_vote() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    Vote::replace(&db, poll.id, 7, Some("alice".to_string()), &[0]).await?;
    Vote::replace(&db, poll.id, 7, Some("alice".to_string()), &[1]).await?;

    let votes = Vote::find_by_poll(&db, poll.id).await?;
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].option_index, 1);
    assert_eq!(votes[0].username.as_deref(), Some("alice"));

    Ok(())
}

#[tokio::test]
async fn test_vote_retraction_clears_rows() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    Vote::replace(&db, poll.id, 7, None, &[0]).await?;
    assert_eq!(Vote::find_by_poll(&db, poll.id).await?.len(), 1);

    Vote::clear(&db, poll.id, 7).await?;
    assert!(Vote::find_by_poll(&db, poll.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_vote_counts_by_option() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    Vote::replace(&db, poll.id, 1, Some("a".to_string()), &[0]).await?;
    Vote::replace(&db, poll.id, 2, Some("b".to_string()), &[0]).await?;
    Vote::replace(&db, poll.id, 3, Some("c".to_string()), &[1]).await?;

    let counts = Vote::counts_by_option(&db, poll.id).await?;
    assert_eq!(counts, vec![(0, 2), (1, 1)]);

    Ok(())
}

#[tokio::test]
async fn test_multi_option_answers_store_one_row_each() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    let inserted = Vote::replace(&db, poll.id, 7, None, &[0, 1]).await?;
    assert_eq!(inserted, 2);

    let votes = Vote::find_by_poll(&db, poll.id).await?;
    assert_eq!(votes.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_delivery_resolves_telegram_poll_id() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let poll = Poll::create(&db, interval_poll(-1, "Q?", 60)).await?;

    let delivery = Delivery::create(&db, poll.id, "tg-abc", poll.chat_id, 42).await?;
    assert_eq!(delivery.poll_id, poll.id);
    assert_eq!(delivery.message_id, 42);
    assert!(!delivery.id.is_empty());

    assert_eq!(Delivery::find_poll_id(&db, "tg-abc").await?, Some(poll.id));
    assert_eq!(Delivery::find_poll_id(&db, "tg-unknown").await?, None);

    Ok(())
}

#[tokio::test]
async fn test_list_all_orders_newest_first() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let first = Poll::create(&db, interval_poll(-1, "First?", 60)).await?;
    let second = Poll::create(&db, interval_poll(-2, "Second?", 60)).await?;

    let all = Poll::list_all(&db).await?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);

    Ok(())
}
