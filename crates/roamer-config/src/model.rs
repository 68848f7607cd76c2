// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoamerConfig {
    /// Bot behavior and wording.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram tokens for the main and support bots.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Location search presentation.
    #[serde(default)]
    pub search: SearchConfig,

    /// Read-only HTTP listing API.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Bot behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in logs and greetings.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name given to trips created from the menu.
    #[serde(default = "default_trip_name")]
    pub default_trip_name: String,

    /// Handle of the support bot, shown by the Support menu button.
    #[serde(default = "default_support_handle")]
    pub support_handle: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
            default_trip_name: default_trip_name(),
            support_handle: default_support_handle(),
        }
    }
}

fn default_bot_name() -> String {
    "roamer".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_trip_name() -> String {
    "My route".to_string()
}

fn default_support_handle() -> String {
    "@TouristSupportHelpBot".to_string()
}

/// Telegram configuration. A missing token disables that bot.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Token of the main (tourist/provider) bot.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Token of the support desk bot.
    #[serde(default)]
    pub support_bot_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("roamer").join("roamer.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("roamer.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Search result presentation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum number of result buttons in one reply.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Location names longer than this are truncated on buttons.
    #[serde(default = "default_label_max_chars")]
    pub label_max_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            label_max_chars: default_label_max_chars(),
        }
    }
}

fn default_max_results() -> usize {
    20
}

fn default_label_max_chars() -> usize {
    30
}

/// HTTP listing API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Also run the API from `roamer serve`. `roamer api` ignores this.
    #[serde(default)]
    pub enabled: bool,

    /// Host address to bind.
    #[serde(default = "default_api_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}
