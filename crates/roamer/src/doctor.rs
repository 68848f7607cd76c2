// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `roamer doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database and both
//! Telegram bots, and prints one line per check.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use roamer_config::model::{RoamerConfig, StorageConfig};
use roamer_core::{HealthStatus, PluginAdapter, RoamerError, StorageAdapter};
use roamer_storage::SqliteStorage;
use roamer_telegram::{MAIN_CHANNEL, SUPPORT_CHANNEL, TelegramChannel};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn finish(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `roamer doctor` command.
pub async fn run_doctor(
    config: &RoamerConfig,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<(), RoamerError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let results = vec![
        check_config(config_path),
        check_database(&config.storage).await,
        check_bot(MAIN_CHANNEL, config.telegram.bot_token.as_deref()).await,
        check_bot(SUPPORT_CHANNEL, config.telegram.support_bot_token.as_deref()).await,
    ];

    println!();
    println!("  roamer doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow().to_string(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red().to_string(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => roamer_config::load_and_validate_path(path),
        None => roamer_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::finish("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::finish(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the database opens, migrates and answers a health check.
async fn check_database(config: &StorageConfig) -> CheckResult {
    let start = Instant::now();

    if !Path::new(&config.database_path).exists() {
        return CheckResult::finish(
            "Database",
            CheckStatus::Warn,
            format!(
                "not found: {} (will be created on first run)",
                config.database_path
            ),
            start,
        );
    }

    let storage = SqliteStorage::new(config.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::finish("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
    }
    let result = match storage.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::finish("Database", CheckStatus::Pass, "connected", start)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::finish("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::finish("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::finish("Database", CheckStatus::Fail, e.to_string(), start),
    };
    let _ = storage.close().await;
    result
}

/// Check a bot token is configured and accepted by Telegram.
async fn check_bot(channel: &str, token: Option<&str>) -> CheckResult {
    let start = Instant::now();
    let name = format!("Bot ({channel})");

    if token.is_none() {
        return CheckResult::finish(&name, CheckStatus::Warn, "no token configured", start);
    }

    let bot = match TelegramChannel::new(channel, token) {
        Ok(bot) => bot,
        Err(e) => return CheckResult::finish(&name, CheckStatus::Fail, e.to_string(), start),
    };
    match tokio::time::timeout(Duration::from_secs(5), bot.health_check()).await {
        Ok(Ok(HealthStatus::Healthy)) => {
            CheckResult::finish(&name, CheckStatus::Pass, "reachable", start)
        }
        Ok(Ok(HealthStatus::Degraded(reason))) => {
            CheckResult::finish(&name, CheckStatus::Warn, reason, start)
        }
        Ok(Ok(HealthStatus::Unhealthy(reason))) => {
            CheckResult::finish(&name, CheckStatus::Fail, reason, start)
        }
        Ok(Err(e)) => CheckResult::finish(&name, CheckStatus::Fail, e.to_string(), start),
        Err(_) => CheckResult::finish(&name, CheckStatus::Fail, "timeout (5s)", start),
    }
}
