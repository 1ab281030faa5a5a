//! Configuration module for the Lingo backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;
use crate::leaderboard;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file backing the key-value store
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Number of entries kept on the leaderboard
    pub leaderboard_size: usize,
    /// Countdown length of the timed challenge
    pub timed_challenge: Duration,
    /// How long a timed-challenge answer stays revealed before advancing
    pub reveal_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("LINGO_DB_PATH")
            .unwrap_or_else(|_| "./data/lingo.sqlite".to_string())
            .into();

        let bind_addr = parse_var("LINGO_BIND_ADDR", "127.0.0.1:8080")?;
        let log_level = env::var("LINGO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let leaderboard_size =
            parse_var("LINGO_LEADERBOARD_SIZE", &leaderboard::DEFAULT_SIZE.to_string())?;
        let timed_secs: u64 = parse_var("LINGO_TIMED_CHALLENGE_SECS", "60")?;
        let reveal_ms: u64 = parse_var("LINGO_REVEAL_DELAY_MS", "1000")?;

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            leaderboard_size,
            timed_challenge: Duration::from_secs(timed_secs),
            reveal_delay: Duration::from_millis(reveal_ms),
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, AppError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| AppError::Internal(format!("Invalid {} value: {}", name, raw)))
}
