pub mod list;
pub mod manage;
pub mod results;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Poll Scheduler Bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Create a recurring poll (group chats only)")]
    CreatePoll,
    #[command(description = "Abort poll creation")]
    Cancel,
    #[command(description = "List this chat's polls")]
    ListPolls,
    #[command(description = "Delete a poll")]
    DeletePoll { id: i64 },
    #[command(description = "Send a poll right now")]
    SendNow { id: i64 },
    #[command(description = "Pause a poll's schedule")]
    PausePoll { id: i64 },
    #[command(description = "Resume a paused poll")]
    ResumePoll { id: i64 },
    #[command(description = "Show vote counts for a poll")]
    Results { id: i64 },
    #[command(description = "Link to the results dashboard")]
    Dashboard,
}

/// Management commands are restricted to chat owner/admins in groups.
/// Private chats have no admin concept, so the sender always qualifies.
pub async fn sender_is_admin(bot: &Bot, msg: &Message) -> ResponseResult<bool> {
    if msg.chat.is_private() {
        return Ok(true);
    }

    let user = match msg.from() {
        Some(user) => user,
        None => return Ok(false),
    };

    let member = bot.get_chat_member(msg.chat.id, user.id).await?;
    Ok(member.is_privileged())
}
