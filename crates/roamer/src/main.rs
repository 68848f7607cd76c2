// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roamer - tourism assistant bots for Telegram.
//!
//! This is the binary entry point. It loads configuration, then runs the
//! main bot, the support bot, the listing API, or one of the maintenance
//! commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod doctor;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roamer_config::RoamerConfig;

/// Roamer - tourism assistant bots for Telegram.
#[derive(Parser, Debug)]
#[command(name = "roamer", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the main bot, plus the support bot when its token is configured.
    Serve,
    /// Run only the support bot.
    Support,
    /// Run only the read-only HTTP listing API.
    Api,
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Run diagnostic checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Manage users and locations.
    Admin {
        #[command(subcommand)]
        action: admin::AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration as TOML, with tokens redacted.
    Show,
    /// Validate the configuration and exit.
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => roamer_config::load_and_validate_path(path),
        None => roamer_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            roamer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config, serve::Mode::Full).await,
        Some(Commands::Support) => serve::run_serve(config, serve::Mode::SupportOnly).await,
        Some(Commands::Api) => serve::run_api(config).await,
        Some(Commands::Config { action }) => {
            match action {
                ConfigCommand::Show => match render_config(&config) {
                    Ok(rendered) => print!("{rendered}"),
                    Err(e) => {
                        eprintln!("error: failed to render configuration: {e}");
                        std::process::exit(1);
                    }
                },
                ConfigCommand::Validate => println!("roamer: configuration is valid"),
            }
            Ok(())
        }
        Some(Commands::Doctor { plain }) => {
            doctor::run_doctor(&config, cli.config.as_deref(), plain).await
        }
        Some(Commands::Admin { action }) => admin::run_admin(&config, action).await,
        None => {
            println!("roamer: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Renders the configuration as TOML with bot tokens masked.
fn render_config(config: &RoamerConfig) -> Result<String, toml::ser::Error> {
    let mut redacted = config.clone();
    for token in [
        &mut redacted.telegram.bot_token,
        &mut redacted.telegram.support_bot_token,
    ] {
        if token.is_some() {
            *token = Some("[redacted]".to_string());
        }
    }
    toml::to_string_pretty(&redacted)
}
