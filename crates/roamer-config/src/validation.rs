// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::RoamerConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure rather than stopping at the first one.
pub fn validate_config(config: &RoamerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let level = config.bot.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "bot.log_level `{}` is not one of {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.bot.default_trip_name.trim().is_empty() {
        fail("bot.default_trip_name must not be empty".to_string());
    }

    if config.search.max_results == 0 {
        fail("search.max_results must be at least 1".to_string());
    }

    if config.search.label_max_chars < 4 {
        fail(format!(
            "search.label_max_chars must be at least 4, got {}",
            config.search.label_max_chars
        ));
    }

    if config.api.host.trim().is_empty() {
        fail("api.host must not be empty".to_string());
    }
    if config.api.port == 0 {
        fail("api.port must not be 0".to_string());
    }

    for (key, token) in [
        ("telegram.bot_token", &config.telegram.bot_token),
        ("telegram.support_bot_token", &config.telegram.support_bot_token),
    ] {
        if token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            fail(format!("{key} must not be empty when set"));
        }
    }

    if let (Some(main), Some(support)) = (
        config.telegram.bot_token.as_deref(),
        config.telegram.support_bot_token.as_deref(),
    ) && !main.trim().is_empty()
        && main == support
    {
        fail("telegram.bot_token and telegram.support_bot_token must differ".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
