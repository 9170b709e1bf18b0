use anyhow::{anyhow, Result};
use chrono::{FixedOffset, Offset, Utc};
use std::env;

use crate::utils::datetime::parse_utc_offset;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/polls.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub database_url: String,
    pub dashboard_host: Option<String>,
    pub http_port: u16,
    pub check_interval_seconds: u64,
    pub timezone: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("BOT_TOKEN")
            .map_err(|_| anyhow!("BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("BOT_TOKEN must be set"));
        }

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let database_url = if database_url.trim().is_empty() {
            DEFAULT_DATABASE_URL.to_string()
        } else {
            database_url
        };

        let dashboard_host = env::var("DASHBOARD_HOST")
            .ok()
            .map(|h| h.trim().trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty());

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let interval_str = env::var("CHECK_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "60".to_string());
        let check_interval_seconds: u64 = interval_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid CHECK_INTERVAL_SECONDS"))?;
        if check_interval_seconds == 0 {
            return Err(anyhow!("CHECK_INTERVAL_SECONDS must be at least 1"));
        }

        let timezone = match env::var("TIMEZONE") {
            Ok(tz) if !tz.trim().is_empty() => parse_utc_offset(tz.trim())
                .map_err(|e| anyhow!("Invalid TIMEZONE: {}", e))?,
            _ => Utc.fix(),
        };

        Ok(Config {
            bot_token: token,
            database_url,
            dashboard_host,
            http_port,
            check_interval_seconds,
            timezone,
        })
    }

    /// Dashboard URL for a single poll, when a public host is configured.
    pub fn poll_url(&self, poll_id: i64) -> Option<String> {
        self.dashboard_host
            .as_ref()
            .map(|host| format!("{host}/polls/{poll_id}"))
    }
}
