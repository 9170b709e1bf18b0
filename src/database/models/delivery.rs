use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::connection::{Backend, DatabaseManager};

/// One poll message the bot actually sent. `telegram_poll_id` is Telegram's
/// id for the poll object and is the only key PollAnswer updates carry.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub poll_id: i64,
    pub telegram_poll_id: String,
    pub chat_id: i64,
    pub message_id: i64,
    pub sent_at: String,
}

impl Delivery {
    pub async fn create(
        db: &DatabaseManager,
        poll_id: i64,
        telegram_poll_id: &str,
        chat_id: i64,
        message_id: i64,
    ) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let sent_at = Utc::now().to_rfc3339();

        match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query(
                    "INSERT INTO deliveries (id, poll_id, telegram_poll_id, chat_id, message_id, sent_at) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(&id)
                .bind(poll_id)
                .bind(telegram_poll_id)
                .bind(chat_id)
                .bind(message_id)
                .bind(&sent_at)
                .execute(pool)
                .await?;
            }
            Backend::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO deliveries (id, poll_id, telegram_poll_id, chat_id, message_id, sent_at) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(&id)
                .bind(poll_id)
                .bind(telegram_poll_id)
                .bind(chat_id)
                .bind(message_id)
                .bind(&sent_at)
                .execute(pool)
                .await?;
            }
        }

        Ok(Delivery {
            id,
            poll_id,
            telegram_poll_id: telegram_poll_id.to_string(),
            chat_id,
            message_id,
            sent_at,
        })
    }

    /// Resolves an incoming PollAnswer's poll id to our poll row, if the
    /// poll was sent by this bot.
    pub async fn find_poll_id(
        db: &DatabaseManager,
        telegram_poll_id: &str,
    ) -> Result<Option<i64>> {
        let poll_id = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT poll_id FROM deliveries WHERE telegram_poll_id = ?",
                )
                .bind(telegram_poll_id)
                .fetch_optional(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT poll_id FROM deliveries WHERE telegram_poll_id = $1",
                )
                .bind(telegram_poll_id)
                .fetch_optional(pool)
                .await?
            }
        };
        Ok(poll_id)
    }
}
