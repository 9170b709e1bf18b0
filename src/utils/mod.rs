/// Date, time and UTC-offset helpers
pub mod datetime;
/// Standardized user-facing feedback messages
pub mod feedback;
/// Structured log helpers
pub mod logging;
/// Telegram MarkdownV2 escaping
pub mod markdown;
/// Input validation for polls and chats
pub mod validation;
