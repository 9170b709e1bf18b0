use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::database::models::{NewPoll, Poll, PollSchedule};
use crate::utils::feedback::CommandFeedback;
use crate::utils::validation::{
    parse_schedule, validate_options, validate_question, validate_telegram_chat_id,
};

/// Poll-creation conversation, one state per prompt.
#[derive(Clone, Default)]
pub enum CreatePollState {
    #[default]
    Idle,
    ReceiveQuestion,
    ReceiveOptions {
        question: String,
    },
    ReceiveSchedule {
        question: String,
        options: Vec<String>,
    },
    ReceivePinned {
        question: String,
        options: Vec<String>,
        schedule: PollSchedule,
    },
    ReceiveDeletePrevious {
        question: String,
        options: Vec<String>,
        schedule: PollSchedule,
        pinned: bool,
    },
}

pub type CreatePollDialogue = Dialogue<CreatePollState, InMemStorage<CreatePollState>>;

/// Interprets a yes/no reply. `None` means "ask again".
fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

pub async fn start(bot: Bot, dialogue: CreatePollDialogue, msg: Message) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    if msg.chat.is_private() {
        feedback
            .validation_error(
                "Polls live in group chats",
                "Add me to a group and run /createpoll there.",
            )
            .await?;
        return Ok(());
    }

    if let Err(e) = validate_telegram_chat_id(msg.chat.id.0) {
        tracing::warn!("Chat validation failed for chat {}: {}", msg.chat.id.0, e);
        feedback
            .error("This chat cannot host polls (invalid chat id)")
            .await?;
        return Ok(());
    }

    dialogue.update(CreatePollState::ReceiveQuestion).await?;
    bot.send_message(
        msg.chat.id,
        "Let's create a poll. What's the question?\n(Use /cancel to abort at any point.)",
    )
    .await?;

    Ok(())
}

pub async fn cancel(bot: Bot, dialogue: CreatePollDialogue, msg: Message) -> HandlerResult {
    let in_progress = !matches!(dialogue.get().await?, Some(CreatePollState::Idle) | None);
    dialogue.exit().await?;

    let feedback = CommandFeedback::new(bot, msg.chat.id);
    if in_progress {
        feedback.info("Poll creation cancelled").await?;
    } else {
        feedback.info("Nothing to cancel").await?;
    }

    Ok(())
}

pub async fn receive_question(
    bot: Bot,
    dialogue: CreatePollDialogue,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the question as text.")
            .await?;
        return Ok(());
    };

    if let Err(e) = validate_question(text) {
        CommandFeedback::new(bot.clone(), msg.chat.id)
            .validation_error(&e.to_string(), "Send a question up to 300 characters.")
            .await?;
        return Ok(());
    }

    dialogue
        .update(CreatePollState::ReceiveOptions {
            question: text.trim().to_string(),
        })
        .await?;
    bot.send_message(
        msg.chat.id,
        "Now send the answer options, separated by commas (2 to 10).",
    )
    .await?;

    Ok(())
}

pub async fn receive_options(
    bot: Bot,
    dialogue: CreatePollDialogue,
    question: String,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the options as text.")
            .await?;
        return Ok(());
    };

    let options = match validate_options(text) {
        Ok(options) => options,
        Err(e) => {
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .validation_error(&e.to_string(), "Example: Monday, Wednesday, Friday")
                .await?;
            return Ok(());
        }
    };

    dialogue
        .update(CreatePollState::ReceiveSchedule { question, options })
        .await?;
    bot.send_message(
        msg.chat.id,
        "How often should it go out?\nSend an interval in minutes (e.g. '1440' or 'every 90') or daily times (e.g. 'at 09:00, 18:00').",
    )
    .await?;

    Ok(())
}

pub async fn receive_schedule(
    bot: Bot,
    dialogue: CreatePollDialogue,
    (question, options): (String, Vec<String>),
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the schedule as text.")
            .await?;
        return Ok(());
    };

    let schedule = match parse_schedule(text) {
        Ok(schedule) => schedule,
        Err(e) => {
            CommandFeedback::new(bot.clone(), msg.chat.id)
                .validation_error(&e.to_string(), "Examples: '1440', 'every 90', 'at 09:00, 18:00'")
                .await?;
            return Ok(());
        }
    };

    dialogue
        .update(CreatePollState::ReceivePinned {
            question,
            options,
            schedule,
        })
        .await?;
    bot.send_message(msg.chat.id, "Pin the poll message each time? (yes/no)")
        .await?;

    Ok(())
}

pub async fn receive_pinned(
    bot: Bot,
    dialogue: CreatePollDialogue,
    (question, options, schedule): (String, Vec<String>, PollSchedule),
    msg: Message,
) -> HandlerResult {
    let Some(pinned) = msg.text().and_then(parse_yes_no) else {
        bot.send_message(msg.chat.id, "Please answer yes or no.")
            .await?;
        return Ok(());
    };

    dialogue
        .update(CreatePollState::ReceiveDeletePrevious {
            question,
            options,
            schedule,
            pinned,
        })
        .await?;
    bot.send_message(
        msg.chat.id,
        "Delete the previous poll message whenever a new one is sent? (yes/no)",
    )
    .await?;

    Ok(())
}

pub async fn receive_delete_previous(
    bot: Bot,
    dialogue: CreatePollDialogue,
    (question, options, schedule, pinned): (String, Vec<String>, PollSchedule, bool),
    msg: Message,
    db: DatabaseManager,
) -> HandlerResult {
    let Some(delete_previous) = msg.text().and_then(parse_yes_no) else {
        bot.send_message(msg.chat.id, "Please answer yes or no.")
            .await?;
        return Ok(());
    };

    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);
    let new_poll = NewPoll {
        chat_id: msg.chat.id.0,
        question,
        options,
        schedule: schedule.clone(),
        pinned,
        delete_previous,
        creator_id: msg.from().map(|u| u.id.0 as i64),
    };

    match Poll::create(&db, new_poll).await {
        Ok(poll) => {
            tracing::info!(
                "Poll {} created in chat {} ({})",
                poll.id,
                poll.chat_id,
                schedule.describe()
            );
            dialogue.exit().await?;
            feedback
                .success(&format!(
                    "Poll #{} created ({}). First send happens on the next sweep; use /sendnow {} to send it immediately.",
                    poll.id,
                    schedule.describe(),
                    poll.id
                ))
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to create poll in chat {}: {}", msg.chat.id.0, e);
            dialogue.exit().await?;
            feedback.error("Failed to save the poll, please try again").await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("yes"), Some(true));
        assert_eq!(parse_yes_no(" Y "), Some(true));
        assert_eq!(parse_yes_no("No"), Some(false));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
        assert_eq!(parse_yes_no(""), None);
    }
}
