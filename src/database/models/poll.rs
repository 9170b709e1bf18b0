use anyhow::{anyhow, Result};
use chrono::{FixedOffset, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::connection::{Backend, DatabaseManager};
use crate::utils::datetime::{latest_occurrence, parse_time_of_day};

const POLL_COLUMNS: &str = "id, chat_id, question, options, interval_minutes, schedule_times, \
     pinned, last_sent, last_message_id, delete_previous, active, creator_id, created_at";

/// A recurring poll definition. `options` and `schedule_times` are JSON
/// arrays stored as text so the row shape is identical on both backends.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub chat_id: i64,
    pub question: String,
    pub options: String,
    pub interval_minutes: Option<i64>,
    pub schedule_times: Option<String>,
    pub pinned: bool,
    pub last_sent: i64,
    pub last_message_id: Option<i64>,
    pub delete_previous: bool,
    pub active: bool,
    pub creator_id: Option<i64>,
    pub created_at: String,
}

/// When a poll gets re-sent: every N minutes, or at fixed times of day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollSchedule {
    Interval { minutes: i64 },
    Daily { times: Vec<NaiveTime> },
}

impl PollSchedule {
    fn into_columns(self) -> Result<(Option<i64>, Option<String>)> {
        match self {
            PollSchedule::Interval { minutes } => Ok((Some(minutes), None)),
            PollSchedule::Daily { times } => {
                let labels: Vec<String> =
                    times.iter().map(|t| t.format("%H:%M").to_string()).collect();
                Ok((None, Some(serde_json::to_string(&labels)?)))
            }
        }
    }

    /// Short human description, e.g. `every 90m` or `daily at 09:00, 18:00`.
    pub fn describe(&self) -> String {
        match self {
            PollSchedule::Interval { minutes } => format!("every {minutes}m"),
            PollSchedule::Daily { times } => {
                let labels: Vec<String> =
                    times.iter().map(|t| t.format("%H:%M").to_string()).collect();
                format!("daily at {}", labels.join(", "))
            }
        }
    }
}

/// Fields needed to insert a poll; `last_sent`, `active` and
/// `last_message_id` start from their defaults.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub chat_id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub schedule: PollSchedule,
    pub pinned: bool,
    pub delete_previous: bool,
    pub creator_id: Option<i64>,
}

impl Poll {
    pub async fn create(db: &DatabaseManager, new: NewPoll) -> Result<Self> {
        let options_json = serde_json::to_string(&new.options)?;
        let (interval_minutes, schedule_times) = new.schedule.into_columns()?;
        let created_at = Utc::now().to_rfc3339();

        let id = match &db.backend {
            Backend::Sqlite(pool) => {
                let result = sqlx::query(
                    "INSERT INTO polls (chat_id, question, options, interval_minutes, schedule_times, pinned, delete_previous, creator_id, created_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(new.chat_id)
                .bind(&new.question)
                .bind(&options_json)
                .bind(interval_minutes)
                .bind(&schedule_times)
                .bind(new.pinned)
                .bind(new.delete_previous)
                .bind(new.creator_id)
                .bind(&created_at)
                .execute(pool)
                .await?;
                result.last_insert_rowid()
            }
            Backend::Postgres(pool) => {
                sqlx::query_scalar::<_, i64>(
                    "INSERT INTO polls (chat_id, question, options, interval_minutes, schedule_times, pinned, delete_previous, creator_id, created_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
                )
                .bind(new.chat_id)
                .bind(&new.question)
                .bind(&options_json)
                .bind(interval_minutes)
                .bind(&schedule_times)
                .bind(new.pinned)
                .bind(new.delete_previous)
                .bind(new.creator_id)
                .bind(&created_at)
                .fetch_one(pool)
                .await?
            }
        };

        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| anyhow!("poll {id} missing right after insert"))
    }

    pub async fn find_by_id(db: &DatabaseManager, id: i64) -> Result<Option<Self>> {
        let poll = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_as::<_, Poll>(&format!(
                    "SELECT {POLL_COLUMNS} FROM polls WHERE id = ?"
                ))
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_as::<_, Poll>(&format!(
                    "SELECT {POLL_COLUMNS} FROM polls WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(pool)
                .await?
            }
        };
        Ok(poll)
    }

    pub async fn list_by_chat(db: &DatabaseManager, chat_id: i64) -> Result<Vec<Self>> {
        let polls = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_as::<_, Poll>(&format!(
                    "SELECT {POLL_COLUMNS} FROM polls WHERE chat_id = ? ORDER BY id"
                ))
                .bind(chat_id)
                .fetch_all(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_as::<_, Poll>(&format!(
                    "SELECT {POLL_COLUMNS} FROM polls WHERE chat_id = $1 ORDER BY id"
                ))
                .bind(chat_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(polls)
    }

    /// All polls the scheduler should consider.
    pub async fn list_active(db: &DatabaseManager) -> Result<Vec<Self>> {
        let sql = format!("SELECT {POLL_COLUMNS} FROM polls WHERE active ORDER BY id");
        let polls = match &db.backend {
            Backend::Sqlite(pool) => sqlx::query_as::<_, Poll>(&sql).fetch_all(pool).await?,
            Backend::Postgres(pool) => sqlx::query_as::<_, Poll>(&sql).fetch_all(pool).await?,
        };
        Ok(polls)
    }

    /// Every poll, newest first, for the dashboard index.
    pub async fn list_all(db: &DatabaseManager) -> Result<Vec<Self>> {
        let sql = format!("SELECT {POLL_COLUMNS} FROM polls ORDER BY id DESC");
        let polls = match &db.backend {
            Backend::Sqlite(pool) => sqlx::query_as::<_, Poll>(&sql).fetch_all(pool).await?,
            Backend::Postgres(pool) => sqlx::query_as::<_, Poll>(&sql).fetch_all(pool).await?,
        };
        Ok(polls)
    }

    /// Records a successful send.
    pub async fn mark_sent(
        db: &DatabaseManager,
        id: i64,
        sent_at: i64,
        message_id: i64,
    ) -> Result<()> {
        match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query("UPDATE polls SET last_sent = ?, last_message_id = ? WHERE id = ?")
                    .bind(sent_at)
                    .bind(message_id)
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            Backend::Postgres(pool) => {
                sqlx::query("UPDATE polls SET last_sent = $1, last_message_id = $2 WHERE id = $3")
                    .bind(sent_at)
                    .bind(message_id)
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }

    /// Pauses or resumes a poll. Returns the number of rows touched.
    pub async fn set_active(db: &DatabaseManager, id: i64, active: bool) -> Result<u64> {
        let affected = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query("UPDATE polls SET active = ? WHERE id = ?")
                    .bind(active)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            Backend::Postgres(pool) => {
                sqlx::query("UPDATE polls SET active = $1 WHERE id = $2")
                    .bind(active)
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };
        Ok(affected)
    }

    /// Deletes the poll; votes and deliveries cascade.
    pub async fn delete(db: &DatabaseManager, id: i64) -> Result<u64> {
        let affected = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query("DELETE FROM polls WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
            Backend::Postgres(pool) => {
                sqlx::query("DELETE FROM polls WHERE id = $1")
                    .bind(id)
                    .execute(pool)
                    .await?
                    .rows_affected()
            }
        };
        Ok(affected)
    }

    /// Decoded option labels.
    pub fn option_list(&self) -> Result<Vec<String>> {
        Ok(serde_json::from_str(&self.options)?)
    }

    /// Decoded schedule. A row always carries exactly one schedule kind.
    pub fn schedule(&self) -> Result<PollSchedule> {
        if let Some(minutes) = self.interval_minutes {
            if minutes > 0 {
                return Ok(PollSchedule::Interval { minutes });
            }
        }

        if let Some(raw) = &self.schedule_times {
            let labels: Vec<String> = serde_json::from_str(raw)?;
            let mut times = Vec::with_capacity(labels.len());
            for label in &labels {
                times.push(parse_time_of_day(label)?);
            }
            if !times.is_empty() {
                return Ok(PollSchedule::Daily { times });
            }
        }

        Err(anyhow!("poll {} has no schedule", self.id))
    }

    /// Whether the scheduler should send this poll now. Paused polls and
    /// rows with an undecodable schedule are never due.
    pub fn is_due(&self, now_ts: i64, tz: &FixedOffset) -> bool {
        if !self.active {
            return false;
        }

        match self.schedule() {
            Ok(PollSchedule::Interval { minutes }) => {
                self.last_sent == 0 || self.last_sent + minutes * 60 <= now_ts
            }
            Ok(PollSchedule::Daily { times }) => {
                match latest_occurrence(&times, now_ts, tz) {
                    Some(due) => due > self.last_sent,
                    None => false,
                }
            }
            Err(_) => false,
        }
    }
}
