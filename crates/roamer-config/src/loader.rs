// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based loader.
//!
//! Merge order, later wins: compiled defaults, `/etc/roamer/roamer.toml`,
//! `~/.config/roamer/roamer.toml`, `./roamer.toml`, `ROAMER_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RoamerConfig;

/// Config sections that may be targeted from the environment.
const ENV_SECTIONS: &[&str] = &["bot", "telegram", "storage", "search", "api"];

/// Candidate config files in merge order.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/roamer/roamer.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("roamer").join("roamer.toml"));
    }
    paths.push(PathBuf::from("roamer.toml"));
    paths
}

/// The Figment used for [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(RoamerConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<RoamerConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<RoamerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoamerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<RoamerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RoamerConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `ROAMER_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token`: only the first
/// underscore after a known section name becomes a dot.
fn env_provider() -> Env {
    Env::prefixed("ROAMER_").map(|key| map_env_key(key.as_str()).into())
}

/// Keys reach the map with their original case; figment only lowercases
/// them afterwards.
fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
