//! Configuration management.
//!
//! Loads settings from environment variables and an optional .env file.
//! Settings are read once at startup and handed to every collaborator;
//! nothing below `main` looks at the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Upstream fixture data API
    pub api_key: String,
    pub api_base_url: String,
    pub league_id: i64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub api_rate_limit: u32,

    // Alerting
    pub goal_alerts: bool,
    pub corner_alerts: bool,
    pub corners_every_n: u64,
    pub simulate: bool,
    pub diag: bool,

    // Telegram sink
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_base_url: String,
    pub parse_mode: String,
    pub telegram_silent: bool,

    // Persisted state
    pub state_dir: PathBuf,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://v3.football.api-sports.io".to_string(),
            league_id: 39,
            request_timeout_secs: 20,
            max_retries: 4,
            api_rate_limit: 5,
            goal_alerts: true,
            corner_alerts: true,
            corners_every_n: 2,
            simulate: false,
            diag: false,
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            telegram_base_url: "https://api.telegram.org".to_string(),
            parse_mode: String::new(),
            telegram_silent: false,
            state_dir: PathBuf::from(".state"),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        Self {
            api_key: env_str("API_FOOTBALL_KEY", &defaults.api_key),
            api_base_url: env_str("API_FOOTBALL_BASE_URL", &defaults.api_base_url),
            league_id: env_i64("LEAGUE_ID", defaults.league_id),
            request_timeout_secs: env_u64("REQUEST_TIMEOUT", defaults.request_timeout_secs),
            max_retries: env_u32("MAX_RETRIES", defaults.max_retries),
            api_rate_limit: env_u32("API_RATE_LIMIT", defaults.api_rate_limit),

            goal_alerts: env_bool("GOAL_ALERTS", defaults.goal_alerts),
            corner_alerts: env_bool("CORNER_ALERTS", defaults.corner_alerts),
            corners_every_n: env_u64("CORNERS_EVERY_N", defaults.corners_every_n),
            simulate: env_bool("SIMULATE_ALERTS", defaults.simulate),
            diag: env_bool("DIAG", defaults.diag),

            telegram_bot_token: env_str("TELEGRAM_BOT_TOKEN", &defaults.telegram_bot_token),
            telegram_chat_id: env_str("TELEGRAM_CHAT_ID", &defaults.telegram_chat_id),
            telegram_base_url: env_str("TELEGRAM_BASE_URL", &defaults.telegram_base_url),
            parse_mode: env_str("PARSE_MODE", &defaults.parse_mode),
            telegram_silent: env_bool("TELEGRAM_SILENT", defaults.telegram_silent),

            state_dir: PathBuf::from(env_str("STATE_DIR", ".state")),

            log_level: env_str("LOG_LEVEL", &defaults.log_level),
            log_json: env_bool("LOG_JSON", defaults.log_json),
        }
    }

    /// Corner cadence, never below one.
    pub fn corner_cadence(&self) -> u64 {
        self.corners_every_n.max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Whether the Telegram sink has both of its credentials.
    pub fn telegram_configured(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }

    /// Validate configuration. Problems are reported, never fatal: the
    /// cycle still runs and the affected calls degrade.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api_key.is_empty() {
            errors.push("API_FOOTBALL_KEY is missing; upstream calls will return nothing".to_string());
        }

        if self.corners_every_n == 0 {
            errors.push("CORNERS_EVERY_N must be >= 1; clamping to 1".to_string());
        }

        if self.max_retries == 0 {
            errors.push("MAX_RETRIES is 0; every upstream call gets a single attempt".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}
