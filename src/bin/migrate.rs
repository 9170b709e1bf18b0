use anyhow::{anyhow, Result};
use sqlx::{PgPool, SqlitePool};
use std::env;
use std::io;
use std::path::Path;

use poll_scheduler_bot::config::Config;
use poll_scheduler_bot::database::connection::{Backend, DatabaseManager};
use poll_scheduler_bot::database::models::{Delivery, Poll, Vote};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the migration
    env_logger::init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "--sqlite" => {
            let sqlite_path = args.get(2).map(|s| s.as_str()).unwrap_or("polls.db");
            copy_sqlite_to_postgres(sqlite_path).await
        }
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Poll Scheduler Bot - Database Migration Tool");
    println!("================================================");

    // Load environment configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("📊 Database URL: {}", mask_url(&config.database_url));

    // Ensure data directory exists for SQLite
    if config.database_url.starts_with("sqlite:") {
        let db_path = config.database_url.strip_prefix("sqlite:").unwrap_or(&config.database_url);
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.exists() {
                println!("📁 Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    println!("🚀 Running database migrations...");

    let db_manager = DatabaseManager::new(&config.database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
            println!("\n🎯 Your poll database is ready!");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    println!("📊 Database URL: {}", mask_url(&config.database_url));

    let db_manager = DatabaseManager::new(&config.database_url).await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db_manager.list_tables().await {
        Ok(tables) => {
            println!("✅ Database connection successful ({})!", db_manager.backend_name());
            println!("📋 Found tables:");
            for table in tables {
                println!("  • {table}");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL data in the database!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // For SQLite, we can just delete the file
    if config.database_url.starts_with("sqlite:") {
        let db_path = config.database_url.strip_prefix("sqlite:").unwrap_or(&config.database_url);
        if Path::new(db_path).exists() {
            std::fs::remove_file(db_path)?;
            println!("🗑️  Deleted database file: {db_path}");
        }
    } else {
        return Err(anyhow!("Reset is only supported for SQLite databases"));
    }

    // Run migrations to recreate the schema
    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");

    Ok(())
}

/// One-time copy of an existing SQLite database into Postgres. Rows whose
/// ids already exist in the target are skipped, so re-running is safe. The
/// SQLite source is never modified.
async fn copy_sqlite_to_postgres(sqlite_path: &str) -> Result<()> {
    println!("📦 Poll Scheduler Bot - SQLite → Postgres copy");
    println!("================================================");

    dotenvy::dotenv().ok();
    let pg_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow!("Set DATABASE_URL to your Postgres DSN"))?;
    if !pg_url.starts_with("postgres") {
        return Err(anyhow!(
            "DATABASE_URL must be a postgres:// URL for the copy, got {}",
            mask_url(&pg_url)
        ));
    }

    if !Path::new(sqlite_path).exists() {
        return Err(anyhow!("SQLite file not found: {sqlite_path}"));
    }

    println!("📊 Source: {sqlite_path}");
    println!("📊 Target: {}", mask_url(&pg_url));

    let source = SqlitePool::connect(&format!("sqlite:{sqlite_path}")).await
        .map_err(|e| anyhow!("Failed to open SQLite file: {}", e))?;

    let target = DatabaseManager::new(&pg_url).await
        .map_err(|e| anyhow!("Failed to connect to Postgres: {}", e))?;
    target.run_migrations().await?;
    let Backend::Postgres(pg) = &target.backend else {
        return Err(anyhow!("Target is not a Postgres database"));
    };

    copy_polls(&source, pg).await?;
    copy_deliveries(&source, pg).await?;
    copy_votes(&source, pg).await?;

    // Advance the id sequence past the copied rows so new polls don't collide.
    sqlx::query(
        "SELECT setval(pg_get_serial_sequence('polls', 'id'), GREATEST((SELECT COALESCE(MAX(id), 1) FROM polls), 1))",
    )
    .execute(pg)
    .await?;

    println!("✅ Copy completed. The SQLite source was left untouched.");

    Ok(())
}

async fn copy_polls(source: &SqlitePool, target: &PgPool) -> Result<()> {
    let polls: Vec<Poll> = sqlx::query_as(
        "SELECT id, chat_id, question, options, interval_minutes, schedule_times, pinned, \
         last_sent, last_message_id, delete_previous, active, creator_id, created_at \
         FROM polls ORDER BY id",
    )
    .fetch_all(source)
    .await?;

    println!("Found {} rows in sqlite polls table.", polls.len());

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for poll in &polls {
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM polls WHERE id = $1")
            .bind(poll.id)
            .fetch_optional(target)
            .await?;
        if exists.is_some() {
            println!("Skipping existing poll id {}", poll.id);
            skipped += 1;
            continue;
        }

        sqlx::query(
            "INSERT INTO polls (id, chat_id, question, options, interval_minutes, schedule_times, \
             pinned, last_sent, last_message_id, delete_previous, active, creator_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(poll.id)
        .bind(poll.chat_id)
        .bind(&poll.question)
        .bind(&poll.options)
        .bind(poll.interval_minutes)
        .bind(&poll.schedule_times)
        .bind(poll.pinned)
        .bind(poll.last_sent)
        .bind(poll.last_message_id)
        .bind(poll.delete_previous)
        .bind(poll.active)
        .bind(poll.creator_id)
        .bind(&poll.created_at)
        .execute(target)
        .await?;
        inserted += 1;
    }

    println!("Inserted {inserted} polls into Postgres ({skipped} skipped).");
    Ok(())
}

async fn copy_deliveries(source: &SqlitePool, target: &PgPool) -> Result<()> {
    let deliveries: Vec<Delivery> = sqlx::query_as(
        "SELECT id, poll_id, telegram_poll_id, chat_id, message_id, sent_at FROM deliveries",
    )
    .fetch_all(source)
    .await?;

    println!("Found {} rows in sqlite deliveries table.", deliveries.len());

    let mut inserted = 0u64;
    for delivery in &deliveries {
        let result = sqlx::query(
            "INSERT INTO deliveries (id, poll_id, telegram_poll_id, chat_id, message_id, sent_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING",
        )
        .bind(&delivery.id)
        .bind(delivery.poll_id)
        .bind(&delivery.telegram_poll_id)
        .bind(delivery.chat_id)
        .bind(delivery.message_id)
        .bind(&delivery.sent_at)
        .execute(target)
        .await?;
        inserted += result.rows_affected();
    }

    println!(
        "Inserted {} deliveries into Postgres ({} skipped).",
        inserted,
        deliveries.len() as u64 - inserted
    );
    Ok(())
}

async fn copy_votes(source: &SqlitePool, target: &PgPool) -> Result<()> {
    let votes: Vec<Vote> = sqlx::query_as(
        "SELECT id, poll_id, user_id, username, option_index, created_at FROM votes",
    )
    .fetch_all(source)
    .await?;

    println!("Found {} rows in sqlite votes table.", votes.len());

    let mut inserted = 0u64;
    for vote in &votes {
        let result = sqlx::query(
            "INSERT INTO votes (id, poll_id, user_id, username, option_index, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT DO NOTHING",
        )
        .bind(&vote.id)
        .bind(vote.poll_id)
        .bind(vote.user_id)
        .bind(&vote.username)
        .bind(vote.option_index)
        .bind(&vote.created_at)
        .execute(target)
        .await?;
        inserted += result.rows_affected();
    }

    println!(
        "Inserted {} votes into Postgres ({} skipped).",
        inserted,
        votes.len() as u64 - inserted
    );
    Ok(())
}

fn mask_url(url: &str) -> String {
    // Don't show full paths or credentials in output
    if url.starts_with("sqlite:") {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(filename) = Path::new(path).file_name() {
            format!("sqlite:.../{}", filename.to_string_lossy())
        } else {
            url.to_string()
        }
    } else if let Some((scheme, rest)) = url.split_once("://") {
        match rest.split_once('@') {
            Some((_credentials, host)) => format!("{scheme}://***@{host}"),
            None => url.to_string(),
        }
    } else {
        url.to_string()
    }
}

fn print_help() {
    println!("📊 Poll Scheduler Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up       Run database migrations (default)");
    println!("    check             Check database connection and schema");
    println!("    reset             Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    --sqlite <path>   Copy an existing SQLite database into Postgres");
    println!("                      (default path: polls.db; target from DATABASE_URL)");
    println!("    help              Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/polls.db)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                                        # Run migrations");
    println!("    migrate check                                  # Check database status");
    println!("    DATABASE_URL=postgres://... migrate --sqlite polls.db");
    println!();
}
