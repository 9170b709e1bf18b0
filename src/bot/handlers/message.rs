use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{self, Command};
use crate::bot::handlers::wizard::{self, CreatePollDialogue};
use crate::bot::handlers::HandlerResult;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::log_command_start;

pub async fn command_handler(
    bot: Bot,
    dialogue: CreatePollDialogue,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    config: Arc<Config>,
) -> HandlerResult {
    let user = msg.from();
    let username = user
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");
    let user_id = user.map(|u| u.id.0 as i64).unwrap_or(0);
    log_command_start(&format!("{cmd:?}"), username, user_id, msg.chat.id.0);

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "📊 Welcome to Poll Scheduler Bot!\n\nUse /createpoll in a group to set up a recurring poll.\nUse /help to see all commands.",
            )
            .await?;
        }
        Command::CreatePoll => {
            wizard::start(bot, dialogue, msg).await?;
        }
        Command::Cancel => {
            wizard::cancel(bot, dialogue, msg).await?;
        }
        Command::ListPolls => {
            commands::list::handle_list_polls(bot, msg, &db, &config).await?;
        }
        Command::DeletePoll { id } => {
            commands::manage::handle_delete(bot, msg, id, &db).await?;
        }
        Command::SendNow { id } => {
            commands::manage::handle_send_now(bot, msg, id, &db).await?;
        }
        Command::PausePoll { id } => {
            commands::manage::handle_set_active(bot, msg, id, false, &db).await?;
        }
        Command::ResumePoll { id } => {
            commands::manage::handle_set_active(bot, msg, id, true, &db).await?;
        }
        Command::Results { id } => {
            commands::results::handle_results(bot, msg, id, &db, &config).await?;
        }
        Command::Dashboard => {
            commands::results::handle_dashboard(bot, msg, &config).await?;
        }
    }
    Ok(())
}

/// Catches messages that matched no command and no wizard state. Replies
/// only to things that look like commands, to avoid spamming group chat.
pub async fn fallback_handler(bot: Bot, msg: Message) -> HandlerResult {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            let command = text.split_whitespace().next().unwrap_or(text);
            let feedback = CommandFeedback::new(bot, msg.chat.id);
            feedback
                .validation_error(
                    &format!("Unknown or malformed command: {command}"),
                    "Use /help to see all available commands, e.g. /deletepoll <id>.",
                )
                .await?;
        }
    }

    Ok(())
}
