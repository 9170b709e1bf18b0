//! # Poll Scheduler Bot
//!
//! A Telegram bot for recurring group polls with a results dashboard.
//!
//! ## Features
//! - Create recurring polls through a chat wizard (interval or daily times)
//! - Automatic re-sending with optional pinning and previous-message cleanup
//! - Vote tracking via non-anonymous poll answers
//! - Web dashboard with aggregated results and health endpoints
//! - SQLite by default, Postgres via `DATABASE_URL`, with a one-time
//!   SQLite-to-Postgres copy tool

/// Bot command handlers and update dispatch
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database connection, models, and migrations
pub mod database;
/// Background scheduler and web dashboard
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
