use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Delivery, Poll};
use crate::utils::logging::{log_dispatch, log_dispatch_error, log_system_event};

/// Background job that sweeps for due polls every
/// `CHECK_INTERVAL_SECONDS` and sends them.
pub struct PollScheduler {
    bot: Bot,
    db: Arc<DatabaseManager>,
    config: Arc<Config>,
    scheduler: JobScheduler,
}

impl PollScheduler {
    pub async fn new(
        bot: Bot,
        db: Arc<DatabaseManager>,
        config: Arc<Config>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            db,
            config,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let config = self.config.clone();
        let interval = self.config.check_interval_seconds;

        let sweep_job = Job::new_repeated_async(Duration::from_secs(interval), move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            let config = config.clone();
            Box::pin(async move {
                if let Err(e) = sweep_due_polls(&bot, &db, &config).await {
                    tracing::error!("Poll sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "poll scheduler started",
            Some(&format!("sweeping every {interval}s")),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// One sweep: send every active poll whose schedule has come around.
/// Failures are per-poll; one broken chat does not stall the rest.
async fn sweep_due_polls(
    bot: &Bot,
    db: &DatabaseManager,
    config: &Config,
) -> anyhow::Result<()> {
    let now = Utc::now().timestamp();
    let polls = Poll::list_active(db).await?;

    for poll in polls {
        if !poll.is_due(now, &config.timezone) {
            continue;
        }

        match dispatch_poll(bot, db, &poll).await {
            Ok(()) => log_dispatch(poll.id, poll.chat_id, Some("scheduled send")),
            Err(e) => log_dispatch_error(poll.id, poll.chat_id, &e.to_string()),
        }
    }

    Ok(())
}

/// Sends one poll: the Telegram poll message first, then the housekeeping
/// around it. Pin and delete-previous failures are logged but never fail
/// the send; the delivery row must land so incoming answers can be routed.
pub async fn dispatch_poll(bot: &Bot, db: &DatabaseManager, poll: &Poll) -> anyhow::Result<()> {
    let options = poll.option_list()?;
    let chat = ChatId(poll.chat_id);

    let message = bot
        .send_poll(chat, poll.question.clone(), options)
        .is_anonymous(false)
        .await?;

    if poll.delete_previous {
        if let Some(previous) = poll.last_message_id {
            if let Err(e) = bot.delete_message(chat, MessageId(previous as i32)).await {
                tracing::warn!(
                    "Could not delete previous poll message {} in chat {}: {}",
                    previous,
                    poll.chat_id,
                    e
                );
            }
        }
    }

    if poll.pinned {
        if let Err(e) = bot.pin_chat_message(chat, message.id).await {
            tracing::warn!("Could not pin poll message in chat {}: {}", poll.chat_id, e);
        }
    }

    match message.poll() {
        Some(telegram_poll) => {
            Delivery::create(
                db,
                poll.id,
                &telegram_poll.id,
                poll.chat_id,
                i64::from(message.id.0),
            )
            .await?;
        }
        None => {
            tracing::warn!("Sent message for poll {} carries no poll payload", poll.id);
        }
    }

    Poll::mark_sent(db, poll.id, Utc::now().timestamp(), i64::from(message.id.0)).await?;

    Ok(())
}
