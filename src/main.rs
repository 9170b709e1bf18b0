//! # Poll Scheduler Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database,
//! starts the poll scheduler, and runs the Telegram bot next to the
//! dashboard HTTP server.

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poll_scheduler_bot::bot::handlers::{self, wizard::CreatePollState};
use poll_scheduler_bot::config::Config;
use poll_scheduler_bot::database::connection::DatabaseManager;
use poll_scheduler_bot::services::dashboard::DashboardService;
use poll_scheduler_bot::services::scheduler::PollScheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poll_scheduler_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    info!("Starting Poll Scheduler Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, sweep every {}s",
        config.database_url, config.http_port, config.check_interval_seconds
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully ({})", db_arc.backend_name());

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.bot_token);

    // Initialize and start the poll scheduler
    let mut poll_scheduler = match PollScheduler::new(bot.clone(), db_arc.clone(), config.clone()).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create poll scheduler: {}", e);
            return Err(anyhow::anyhow!("Failed to create poll scheduler: {}", e));
        }
    };

    if let Err(e) = poll_scheduler.start().await {
        tracing::error!("Failed to start poll scheduler: {}", e);
    } else {
        info!("Poll scheduler started successfully");
    }

    // Dashboard + health server
    let dashboard = DashboardService::new(db_arc.clone(), config.timezone);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Dashboard server starting on port {}", config.http_port);

    // Run both the bot and the dashboard concurrently
    let bot_db = db_arc.as_ref().clone();
    let bot_config = config.clone();
    let bot_task = tokio::spawn(async move {
        let storage = InMemStorage::<CreatePollState>::new();
        Dispatcher::builder(bot, handlers::schema())
            .dependencies(dptree::deps![storage, bot_db, bot_config])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let dashboard_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, dashboard.router).await {
            tracing::error!("Dashboard server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = dashboard_task => {
            if let Err(e) = result2 {
                tracing::error!("Dashboard task error: {}", e);
            }
        }
    }

    // Stop the scheduler on shutdown
    if let Err(e) = poll_scheduler.stop().await {
        tracing::warn!("Error stopping poll scheduler: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
