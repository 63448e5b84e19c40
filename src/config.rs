use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SportsPlex REST API base URL
    pub api_url: String,

    /// Bearer token for the SportsPlex API
    pub api_token: Option<String>,

    /// Interval in seconds for polling the match list
    pub match_poll_interval: u64,

    /// HTTP request timeout in seconds
    pub request_timeout: u64,

    /// SQLite database path for the transition log
    pub database_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api_url: env::var("SPORTSPLEX_API_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),

            api_token: env::var("SPORTSPLEX_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),

            match_poll_interval: parse_secs("MATCH_POLL_INTERVAL", "30")?,

            request_timeout: parse_secs("REQUEST_TIMEOUT", "10")?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/transitions.db".to_string()),
        })
    }
}

fn parse_secs(key: &str, default: &str) -> Result<u64> {
    let secs: u64 = env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a valid number"))?;

    anyhow::ensure!(secs > 0, "{key} must be greater than zero");
    Ok(secs)
}
