use anyhow::{anyhow, Result};
use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::{PgPool, Sqlite, SqlitePool};
use tracing::info;

static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

/// The connection pool for whichever backend `DATABASE_URL` selected.
#[derive(Clone)]
pub enum Backend {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

#[derive(Clone)]
pub struct DatabaseManager {
    pub backend: Backend,
}

impl DatabaseManager {
    /// Connects to the database named by `database_url`. SQLite files are
    /// created on first use; the backend is picked from the URL scheme.
    pub async fn new(database_url: &str) -> Result<Self> {
        if database_url.starts_with("sqlite") {
            if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
                info!("Creating database {}", database_url);
                Sqlite::create_database(database_url).await?;
            }

            let pool = SqlitePool::connect(database_url).await?;
            Ok(Self {
                backend: Backend::Sqlite(pool),
            })
        } else if database_url.starts_with("postgres") {
            let pool = PgPool::connect(database_url).await?;
            Ok(Self {
                backend: Backend::Postgres(pool),
            })
        } else {
            Err(anyhow!(
                "Unsupported DATABASE_URL '{database_url}': expected sqlite:... or postgres://..."
            ))
        }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations ({})", self.backend_name());
        match &self.backend {
            Backend::Sqlite(pool) => SQLITE_MIGRATOR.run(pool).await?,
            Backend::Postgres(pool) => POSTGRES_MIGRATOR.run(pool).await?,
        }
        Ok(())
    }

    /// Cheap connectivity check used by the health endpoints.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        match &self.backend {
            Backend::Sqlite(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
            Backend::Postgres(pool) => {
                sqlx::query("SELECT 1").fetch_one(pool).await?;
            }
        }
        Ok(())
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Sqlite(_) => "sqlite",
            Backend::Postgres(_) => "postgres",
        }
    }

    pub fn pool_size(&self) -> u32 {
        match &self.backend {
            Backend::Sqlite(pool) => pool.size(),
            Backend::Postgres(pool) => pool.size(),
        }
    }

    /// Lists user tables, for the migration tool's `check` command.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = match &self.backend {
            Backend::Sqlite(pool) => {
                sqlx::query_scalar::<_, String>(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                )
                .fetch_all(pool)
                .await?
            }
            Backend::Postgres(pool) => {
                sqlx::query_scalar::<_, String>(
                    "SELECT tablename FROM pg_tables WHERE schemaname = 'public' ORDER BY tablename",
                )
                .fetch_all(pool)
                .await?
            }
        };
        Ok(tables)
    }
}
