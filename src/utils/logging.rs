use tracing::{info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: i64, chat_id: i64) {
    info!(
        "CMD_START: {} by {}({}) in chat {}",
        command, user, user_id, chat_id
    );
}

/// Logs poll dispatch outcomes with consistent format
pub fn log_dispatch(poll_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("DISPATCH: poll {} to chat {} - {}", poll_id, chat_id, d),
        None => info!("DISPATCH: poll {} to chat {}", poll_id, chat_id),
    }
}

/// Logs dispatch failures with consistent format
pub fn log_dispatch_error(poll_id: i64, chat_id: i64, error: &str) {
    warn!("DISPATCH_ERROR: poll {} to chat {} - {}", poll_id, chat_id, error);
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
