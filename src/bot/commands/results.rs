use teloxide::prelude::*;

use crate::bot::handlers::HandlerResult;
use crate::config::Config;
use crate::database::{connection::DatabaseManager, models::{Poll, Vote}};
use crate::utils::feedback::CommandFeedback;

pub async fn handle_results(
    bot: Bot,
    msg: Message,
    poll_id: i64,
    db: &DatabaseManager,
    config: &Config,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), msg.chat.id);

    let poll = match Poll::find_by_id(db, poll_id).await {
        Ok(Some(poll)) if poll.chat_id == msg.chat.id.0 => poll,
        Ok(Some(_)) => {
            feedback
                .error("That poll belongs to a different chat")
                .await?;
            return Ok(());
        }
        Ok(None) => {
            feedback
                .validation_error(
                    &format!("No poll with id {poll_id}"),
                    "Use /listpolls to see this chat's polls and their ids.",
                )
                .await?;
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to load poll {}: {}", poll_id, e);
            feedback.error("Failed to load the poll from the database").await?;
            return Ok(());
        }
    };

    let labels = match poll.option_list() {
        Ok(labels) => labels,
        Err(e) => {
            tracing::error!("Poll {} has undecodable options: {}", poll.id, e);
            feedback.error("This poll's options could not be decoded").await?;
            return Ok(());
        }
    };

    let counts = match Vote::counts_by_option(db, poll.id).await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!("Failed to count votes for poll {}: {}", poll.id, e);
            feedback.error("Failed to load vote counts").await?;
            return Ok(());
        }
    };

    let mut per_option = vec![0i64; labels.len()];
    for (index, votes) in counts {
        if let Some(slot) = per_option.get_mut(index as usize) {
            *slot = votes;
        }
    }
    let total: i64 = per_option.iter().sum();

    let mut text = format!("📊 Poll #{}\n{}\n\n", poll.id, poll.question);
    for (label, votes) in labels.iter().zip(&per_option) {
        if total > 0 {
            text.push_str(&format!("{label}: {votes} ({}%)\n", votes * 100 / total));
        } else {
            text.push_str(&format!("{label}: 0\n"));
        }
    }
    text.push_str(&format!("\nTotal votes: {total}"));

    if let Some(url) = config.poll_url(poll.id) {
        text.push_str(&format!("\nFull results: {url}"));
    }

    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

pub async fn handle_dashboard(bot: Bot, msg: Message, config: &Config) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    match &config.dashboard_host {
        Some(host) => {
            feedback
                .info(&format!("Results dashboard: {host}"))
                .await?;
        }
        None => {
            feedback
                .info("No dashboard is configured for this deployment (DASHBOARD_HOST is unset)")
                .await?;
        }
    }

    Ok(())
}
