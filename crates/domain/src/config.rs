//! Configuration management

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COMPLETED_MARKER, DEFAULT_MINUTE_WEIGHTS, DEFAULT_REPEAT_ALERT_THRESHOLD_PCT,
    DEFAULT_TIMEZONE,
};
use crate::errors::{OpsPulseError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// IANA timezone identifier the report is computed in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Status literal marking completed records (case-insensitive match).
    #[serde(default = "default_completed_marker")]
    pub completed_marker: String,
    #[serde(default)]
    pub minute_weights: MinuteWeights,
    #[serde(default = "default_repeat_threshold")]
    pub repeat_alert_threshold_pct: f64,
    /// Chats receiving the daily report.
    pub chat_ids: Vec<i64>,
    /// Chats receiving the birthday digest; empty means `chat_ids`.
    #[serde(default)]
    pub birthday_chat_ids: Vec<i64>,
    /// Category catalog override (code -> display name). `None` uses the
    /// built-in defaults or the source lookup table.
    #[serde(default)]
    pub categories: Option<BTreeMap<String, String>>,
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub bitrix: Option<BitrixConfig>,
}

impl ReportConfig {
    /// Parse the configured timezone identifier.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| OpsPulseError::Config(format!("Invalid timezone: {}", self.timezone)))
    }

    /// Chats the birthday digest goes to, falling back to the report chats.
    pub fn birthday_chats(&self) -> &[i64] {
        if self.birthday_chat_ids.is_empty() {
            &self.chat_ids
        } else {
            &self.birthday_chat_ids
        }
    }
}

/// Estimated minutes spent per call, by call-length category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MinuteWeights {
    pub small: u32,
    pub medium: u32,
    pub long: u32,
}

impl Default for MinuteWeights {
    fn default() -> Self {
        let [small, medium, long] = DEFAULT_MINUTE_WEIGHTS;
        Self { small, medium, long }
    }
}

/// Record source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Sqlite(SqliteSourceConfig),
    Sheet(SheetSourceConfig),
}

/// SQLite record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteSourceConfig {
    pub path: String,
    pub table: String,
    /// Optional code/name lookup table for the category catalog.
    #[serde(default)]
    pub catalog_table: Option<String>,
    #[serde(default)]
    pub columns: ColumnMap,
}

/// HTTP sheet record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSourceConfig {
    /// Endpoint returning `{"values": [[...], ...]}` with a header row.
    pub url: String,
    #[serde(default)]
    pub columns: ColumnMap,
}

/// Maps source column names to the canonical record fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMap {
    pub timestamp: String,
    pub employee: String,
    pub category: String,
    pub phone: String,
    pub status: String,
    pub comment: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        // Header names of the original support spreadsheet.
        Self {
            timestamp: "Дата/час".to_string(),
            employee: "Співробітник".to_string(),
            category: "Категорія".to_string(),
            phone: "Телефон клієнта".to_string(),
            status: "Статус".to_string(),
            comment: "Коментар".to_string(),
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(skip_serializing)]
    pub token: String,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

/// Bitrix24 CRM endpoints for the birthday digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitrixConfig {
    /// `crm.contact.list` endpoint (clients).
    #[serde(default)]
    pub contact_url: Option<String>,
    /// `user.get` endpoint (employees).
    #[serde(default)]
    pub users_url: Option<String>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_completed_marker() -> String {
    DEFAULT_COMPLETED_MARKER.to_string()
}

fn default_repeat_threshold() -> f64 {
    DEFAULT_REPEAT_ALERT_THRESHOLD_PCT
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config(timezone: &str) -> ReportConfig {
        ReportConfig {
            timezone: timezone.to_string(),
            completed_marker: default_completed_marker(),
            minute_weights: MinuteWeights::default(),
            repeat_alert_threshold_pct: default_repeat_threshold(),
            chat_ids: vec![1, 2],
            birthday_chat_ids: vec![],
            categories: None,
            source: SourceConfig::Sheet(SheetSourceConfig {
                url: "https://example.com/values".to_string(),
                columns: ColumnMap::default(),
            }),
            telegram: TelegramConfig {
                token: "token".to_string(),
                api_base: default_telegram_api_base(),
            },
            bitrix: None,
        }
    }

    #[test]
    fn parses_valid_timezone() {
        let config = minimal_config("Europe/Kyiv");
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Kyiv);
    }

    #[test]
    fn rejects_invalid_timezone() {
        let config = minimal_config("Mars/Olympus_Mons");
        assert!(matches!(config.tz(), Err(OpsPulseError::Config(_))));
    }

    #[test]
    fn birthday_chats_fall_back_to_report_chats() {
        let mut config = minimal_config("Europe/Kyiv");
        assert_eq!(config.birthday_chats(), &[1, 2]);

        config.birthday_chat_ids = vec![9];
        assert_eq!(config.birthday_chats(), &[9]);
    }

    #[test]
    fn default_minute_weights_match_policy() {
        let weights = MinuteWeights::default();
        assert_eq!((weights.small, weights.medium, weights.long), (10, 30, 50));
    }
}
