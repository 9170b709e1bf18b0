use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::connection::{Backend, DatabaseManager};

/// One selected option by one user. Telegram delivers the full selection on
/// every answer, so a re-vote replaces all of the user's rows for the poll.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub poll_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub option_index: i64,
    pub created_at: String,
}

impl Vote {
    /// Replaces the user's votes on a poll with `option_indices`. An empty
    /// slice is a retraction. Returns the number of rows inserted.
    pub async fn replace(
        db: &DatabaseManager,
        poll_id: i64,
        user_id: i64,
        username: Option<String>,
        option_indices: &[i64],
    ) -> Result<usize> {
        Self::clear(db, poll_id, user_id).await?;

        let now = Utc::now().to_rfc3339();
        for index in option_indices {
            let id = Uuid::new_v4().to_string();
            match &db.backend {
                Backend::Sqlite(pool) => {
                    sqlx::query(
                        "INSERT INTO votes (id, poll_id, user_id, username, option_index, created_at) \
                         VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&id)
                    .bind(poll_id)
                    .bind(user_id)
                    .bind(&username)
                    .bind(index)
                    .bind(&now)
                    .execute(pool)
                    .await?;
                }
                Backend::Postgres(pool) => {
                    sqlx::query(
                        "INSERT INTO votes (id, poll_id, user_id, username, option_index, created_at) \
                         VALUES ($1, $2, $3, $4, $5, $6)",
                    )
                    .bind(&id)
                    .bind(poll_id)
                    .bind(user_id)
                    .bind(&username)
                    .bind(index)
                    .bind(&now)
                    .execute(pool)
                    .await?;
                }
            }
        }

        Ok(option_indices.len())
    }

    /// Removes all of a user's votes on a poll.
    pub async fn clear(db: &DatabaseManager, poll_id: i64, user_id: i64) -> Result<()> {
        match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query("DELETE FROM votes WHERE poll_id = ? AND user_id = ?")
                    .bind(poll_id)
                    .bind(user_id)
                    .execute(pool)
                    .await?;
            }
            Backend::Postgres(pool) => {
                sqlx::query("DELETE FROM votes WHERE poll_id = $1 AND user_id = $2")
                    .bind(poll_id)
                    .bind(user_id)
                    .execute(pool)
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn find_by_poll(db: &DatabaseManager, poll_id: i64) -> Result<Vec<Self>> {
        let votes = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_as::<_, Vote>(
                    "SELECT id, poll_id, user_id, username, option_index, created_at \
                     FROM votes WHERE poll_id = ? ORDER BY created_at",
                )
                .bind(poll_id)
                .fetch_all(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_as::<_, Vote>(
                    "SELECT id, poll_id, user_id, username, option_index, created_at \
                     FROM votes WHERE poll_id = $1 ORDER BY created_at",
                )
                .bind(poll_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(votes)
    }

    /// Vote totals per option index, ascending. Options nobody picked are
    /// absent; callers fill in zeroes.
    pub async fn counts_by_option(db: &DatabaseManager, poll_id: i64) -> Result<Vec<(i64, i64)>> {
        let counts = match &db.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_as::<_, (i64, i64)>(
                    "SELECT option_index, COUNT(*) FROM votes WHERE poll_id = ? \
                     GROUP BY option_index ORDER BY option_index",
                )
                .bind(poll_id)
                .fetch_all(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_as::<_, (i64, i64)>(
                    "SELECT option_index, COUNT(*) FROM votes WHERE poll_id = $1 \
                     GROUP BY option_index ORDER BY option_index",
                )
                .bind(poll_id)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(counts)
    }
}
