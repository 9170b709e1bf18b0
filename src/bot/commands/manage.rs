use teloxide::prelude::*;

use crate::bot::commands::sender_is_admin;
use crate::bot::handlers::HandlerResult;
use crate::database::{connection::DatabaseManager, models::Poll};
use crate::services::scheduler::dispatch_poll;
use crate::utils::feedback::CommandFeedback;

/// Loads a poll and checks it belongs to the chat the command came from.
/// Sends the error reply itself and returns `None` when the lookup fails.
async fn poll_for_chat(
    feedback: &CommandFeedback,
    db: &DatabaseManager,
    poll_id: i64,
    chat_id: i64,
) -> HandlerResult<Option<Poll>> {
    let poll = match Poll::find_by_id(db, poll_id).await {
        Ok(poll) => poll,
        Err(e) => {
            tracing::error!("Failed to load poll {}: {}", poll_id, e);
            feedback.error("Failed to load the poll from the database").await?;
            return Ok(None);
        }
    };

    let Some(poll) = poll else {
        feedback
            .validation_error(
                &format!("No poll with id {poll_id}"),
                "Use /listpolls to see this chat's polls and their ids.",
            )
            .await?;
        return Ok(None);
    };

    if poll.chat_id != chat_id {
        feedback
            .error("That poll belongs to a different chat")
            .await?;
        return Ok(None);
    }

    Ok(Some(poll))
}

async fn ensure_admin(bot: &Bot, msg: &Message, feedback: &CommandFeedback) -> HandlerResult<bool> {
    if sender_is_admin(bot, msg).await? {
        return Ok(true);
    }
    feedback
        .error("Only chat admins can manage polls")
        .await?;
    Ok(false)
}

pub async fn handle_delete(
    bot: Bot,
    msg: Message,
    poll_id: i64,
    db: &DatabaseManager,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    if !ensure_admin(&bot, &msg, &feedback).await? {
        return Ok(());
    }

    let Some(poll) = poll_for_chat(&feedback, db, poll_id, msg.chat.id.0).await? else {
        return Ok(());
    };

    match Poll::delete(db, poll.id).await {
        Ok(_) => {
            tracing::info!("Poll {} deleted from chat {}", poll.id, poll.chat_id);
            feedback
                .success(&format!("Poll #{} deleted", poll.id))
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to delete poll {}: {}", poll.id, e);
            feedback.error("Failed to delete the poll").await?;
        }
    }

    Ok(())
}

pub async fn handle_send_now(
    bot: Bot,
    msg: Message,
    poll_id: i64,
    db: &DatabaseManager,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    if !ensure_admin(&bot, &msg, &feedback).await? {
        return Ok(());
    }

    let Some(poll) = poll_for_chat(&feedback, db, poll_id, msg.chat.id.0).await? else {
        return Ok(());
    };

    if let Err(e) = dispatch_poll(&bot, db, &poll).await {
        tracing::error!("Manual send of poll {} failed: {}", poll.id, e);
        feedback.error("Failed to send the poll").await?;
    }

    Ok(())
}

pub async fn handle_set_active(
    bot: Bot,
    msg: Message,
    poll_id: i64,
    active: bool,
    db: &DatabaseManager,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    if !ensure_admin(&bot, &msg, &feedback).await? {
        return Ok(());
    }

    let Some(poll) = poll_for_chat(&feedback, db, poll_id, msg.chat.id.0).await? else {
        return Ok(());
    };

    match Poll::set_active(db, poll.id, active).await {
        Ok(_) => {
            let verb = if active { "resumed" } else { "paused" };
            tracing::info!("Poll {} {} in chat {}", poll.id, verb, poll.chat_id);
            feedback
                .success(&format!("Poll #{} {}", poll.id, verb))
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to update poll {}: {}", poll.id, e);
            feedback.error("Failed to update the poll").await?;
        }
    }

    Ok(())
}
