use teloxide::types::PollAnswer;

use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Delivery, Vote};

/// Records votes arriving as PollAnswer updates. Telegram only sends these
/// for non-anonymous polls; answers for polls we did not send are ignored.
pub async fn poll_answer_handler(answer: PollAnswer, db: DatabaseManager) -> HandlerResult {
    let poll_id = match Delivery::find_poll_id(&db, &answer.poll_id).await {
        Ok(Some(poll_id)) => poll_id,
        Ok(None) => {
            tracing::debug!("Ignoring answer for unknown telegram poll {}", answer.poll_id);
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to resolve telegram poll {}: {}", answer.poll_id, e);
            return Ok(());
        }
    };

    let user_id = answer.user.id.0 as i64;
    let username = answer.user.username.clone();
    let option_indices: Vec<i64> = answer.option_ids.iter().map(|&i| i64::from(i)).collect();

    let result = if option_indices.is_empty() {
        Vote::clear(&db, poll_id, user_id).await.map(|_| 0)
    } else {
        Vote::replace(&db, poll_id, user_id, username, &option_indices).await
    };

    match result {
        Ok(0) => tracing::info!("User {} retracted vote on poll {}", user_id, poll_id),
        Ok(n) => tracing::info!("User {} voted on poll {} ({} option(s))", user_id, poll_id, n),
        Err(e) => tracing::error!("Failed to record vote on poll {}: {}", poll_id, e),
    }

    Ok(())
}
