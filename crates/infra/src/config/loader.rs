//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `OPSPULSE_TELEGRAM_TOKEN`: Telegram bot token (required)
//! - `OPSPULSE_CHAT_IDS`: comma-separated report chat ids (required)
//! - `OPSPULSE_SOURCE_KIND`: `sqlite` or `sheet` (required)
//! - `OPSPULSE_SQLITE_PATH` / `OPSPULSE_SQLITE_TABLE`: SQLite source
//! - `OPSPULSE_SQLITE_CATALOG_TABLE`: optional category lookup table
//! - `OPSPULSE_SHEET_URL`: sheet source endpoint
//! - `OPSPULSE_TIMEZONE`: IANA timezone (default `Europe/Kyiv`)
//! - `OPSPULSE_COMPLETED_MARKER`: completed-status literal
//! - `OPSPULSE_MINUTE_WEIGHTS`: `small,medium,long` call minutes
//! - `OPSPULSE_REPEAT_ALERT_THRESHOLD`: repeat-share alert percentage
//! - `OPSPULSE_BIRTHDAY_CHAT_IDS`: comma-separated digest chat ids
//! - `OPSPULSE_TELEGRAM_API_BASE`: Bot API base URL override
//! - `OPSPULSE_BITRIX_CONTACT_URL` / `OPSPULSE_BITRIX_USERS_URL`: CRM
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `opspulse.{json,toml}` in
//! the working directory, its parents (2 levels) and next to the
//! executable.

use std::path::{Path, PathBuf};

use opspulse_domain::constants::{
    DEFAULT_COMPLETED_MARKER, DEFAULT_REPEAT_ALERT_THRESHOLD_PCT, DEFAULT_TIMEZONE,
};
use opspulse_domain::{
    BitrixConfig, ColumnMap, MinuteWeights, OpsPulseError, ReportConfig, Result,
    SheetSourceConfig, SourceConfig, SqliteSourceConfig, TelegramConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
pub fn load() -> Result<ReportConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Required variables must be present; the rest fall back to defaults.
pub fn load_from_env() -> Result<ReportConfig> {
    let telegram_token = env_var("OPSPULSE_TELEGRAM_TOKEN")?;
    let chat_ids = parse_int_list(&env_var("OPSPULSE_CHAT_IDS")?, "OPSPULSE_CHAT_IDS")?;
    if chat_ids.is_empty() {
        return Err(OpsPulseError::Config("OPSPULSE_CHAT_IDS is empty".into()));
    }

    let source = source_from_env()?;

    let birthday_chat_ids = match std::env::var("OPSPULSE_BIRTHDAY_CHAT_IDS") {
        Ok(raw) => parse_int_list(&raw, "OPSPULSE_BIRTHDAY_CHAT_IDS")?,
        Err(_) => Vec::new(),
    };

    let minute_weights = match std::env::var("OPSPULSE_MINUTE_WEIGHTS") {
        Ok(raw) => parse_weights(&raw)?,
        Err(_) => MinuteWeights::default(),
    };

    let repeat_alert_threshold_pct = match std::env::var("OPSPULSE_REPEAT_ALERT_THRESHOLD") {
        Ok(raw) => raw.trim().parse::<f64>().map_err(|e| {
            OpsPulseError::Config(format!("Invalid repeat alert threshold: {e}"))
        })?,
        Err(_) => DEFAULT_REPEAT_ALERT_THRESHOLD_PCT,
    };

    let bitrix = bitrix_from_env();

    Ok(ReportConfig {
        timezone: env_or("OPSPULSE_TIMEZONE", DEFAULT_TIMEZONE),
        completed_marker: env_or("OPSPULSE_COMPLETED_MARKER", DEFAULT_COMPLETED_MARKER),
        minute_weights,
        repeat_alert_threshold_pct,
        chat_ids,
        birthday_chat_ids,
        categories: None,
        source,
        telegram: TelegramConfig {
            token: telegram_token,
            api_base: env_or("OPSPULSE_TELEGRAM_API_BASE", "https://api.telegram.org"),
        },
        bitrix,
    })
}

fn source_from_env() -> Result<SourceConfig> {
    let kind = env_var("OPSPULSE_SOURCE_KIND")?;
    match kind.trim().to_ascii_lowercase().as_str() {
        "sqlite" => Ok(SourceConfig::Sqlite(SqliteSourceConfig {
            path: env_var("OPSPULSE_SQLITE_PATH")?,
            table: env_var("OPSPULSE_SQLITE_TABLE")?,
            catalog_table: std::env::var("OPSPULSE_SQLITE_CATALOG_TABLE").ok(),
            columns: ColumnMap::default(),
        })),
        "sheet" => Ok(SourceConfig::Sheet(SheetSourceConfig {
            url: env_var("OPSPULSE_SHEET_URL")?,
            columns: ColumnMap::default(),
        })),
        other => Err(OpsPulseError::Config(format!("Unknown source kind: {other}"))),
    }
}

fn bitrix_from_env() -> Option<BitrixConfig> {
    let contact_url = std::env::var("OPSPULSE_BITRIX_CONTACT_URL").ok();
    let users_url = std::env::var("OPSPULSE_BITRIX_USERS_URL").ok();
    if contact_url.is_none() && users_url.is_none() {
        return None;
    }
    Some(BitrixConfig { contact_url, users_url })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<ReportConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OpsPulseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OpsPulseError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OpsPulseError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<ReportConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OpsPulseError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OpsPulseError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OpsPulseError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe standard locations for a configuration file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.json", "config.toml", "opspulse.json", "opspulse.toml"];
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for prefix in ["", "../", "../../"] {
            for name in names {
                candidates.push(cwd.join(format!("{prefix}{name}")));
            }
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            for name in names {
                candidates.push(exe_dir.join(name));
            }
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| OpsPulseError::Config(format!("Missing required environment variable: {key}")))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated integer list, skipping blank entries.
fn parse_int_list(raw: &str, key: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|e| OpsPulseError::Config(format!("Invalid integer in {key}: {e}")))
        })
        .collect()
}

/// Parse `small,medium,long` minute weights.
fn parse_weights(raw: &str) -> Result<MinuteWeights> {
    let parts: Vec<u32> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map_err(|e| OpsPulseError::Config(format!("Invalid minute weight: {e}")))
        })
        .collect::<Result<_>>()?;

    match parts.as_slice() {
        [small, medium, long] => Ok(MinuteWeights { small: *small, medium: *medium, long: *long }),
        _ => Err(OpsPulseError::Config(format!(
            "OPSPULSE_MINUTE_WEIGHTS expects 3 values, got {}",
            parts.len()
        ))),
    }
}
