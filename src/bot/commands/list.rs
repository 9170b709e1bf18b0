use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::Poll};
use crate::utils::datetime::format_timestamp;
use crate::utils::feedback::CommandFeedback;

pub async fn handle_list_polls(
    bot: Bot,
    msg: Message,
    db: &DatabaseManager,
    config: &Config,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let polls = match Poll::list_by_chat(db, chat_id).await {
        Ok(polls) => polls,
        Err(e) => {
            tracing::error!("Failed to list polls for chat {}: {}", chat_id, e);
            feedback.error("Failed to load polls from the database").await?;
            return Ok(());
        }
    };

    if polls.is_empty() {
        feedback
            .info("No polls in this chat yet. Create one with /createpoll")
            .await?;
        return Ok(());
    }

    let mut text = String::from("📋 Polls in this chat:\n\n");
    for poll in &polls {
        let schedule = poll
            .schedule()
            .map(|s| s.describe())
            .unwrap_or_else(|_| "unscheduled".to_string());

        let mut flags = Vec::new();
        if poll.pinned {
            flags.push("pinned");
        }
        if poll.delete_previous {
            flags.push("replaces previous");
        }
        if !poll.active {
            flags.push("paused");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" | {}", flags.join(", "))
        };

        let last_sent = if poll.last_sent > 0 {
            format_timestamp(poll.last_sent, &config.timezone)
        } else {
            "never".to_string()
        };

        text.push_str(&format!(
            "#{} '{}' | {}{} | last sent: {}\n",
            poll.id, poll.question, schedule, flags, last_sent
        ));
    }

    text.push_str("\nUse /results <id> for vote counts, /sendnow <id> to send immediately.");

    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}
