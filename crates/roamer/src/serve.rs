// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `roamer serve`, `roamer support` and `roamer api` command implementation.
//!
//! Opens the shared SQLite store, connects the Telegram bots and runs each
//! one's update loop until a shutdown signal arrives or a channel closes.
//! Both bots share one store; the main bot owns the session directory. The
//! listing API runs alongside them when `api.enabled` is set.

use std::sync::Arc;

use roamer_agent::{
    Concierge, ConciergeSettings, InboundHandler, SessionDirectory, SupportDesk, shutdown,
};
use roamer_api::ApiState;
use roamer_config::model::RoamerConfig;
use roamer_core::{ChannelAdapter, PluginAdapter, RoamerError, StorageAdapter};
use roamer_storage::SqliteStorage;
use roamer_telegram::TelegramChannel;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Which bots a serve invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Main bot, plus the support bot when `telegram.support_bot_token` is set.
    Full,
    /// Support bot only.
    SupportOnly,
}

/// Runs the bots selected by `mode`.
pub async fn run_serve(config: RoamerConfig, mode: Mode) -> Result<(), RoamerError> {
    init_tracing(&config.bot.log_level);

    info!(bot = %config.bot.name, ?mode, "starting roamer");

    let mut channels = Vec::new();
    let main_channel = match mode {
        Mode::Full => Some(connect(TelegramChannel::main_bot(&config.telegram)?).await?),
        Mode::SupportOnly => None,
    };
    let support_channel = match (mode, &config.telegram.support_bot_token) {
        (Mode::SupportOnly, _) | (Mode::Full, Some(_)) => {
            Some(connect(TelegramChannel::support_bot(&config.telegram)?).await?)
        }
        (Mode::Full, None) => {
            info!("no support bot token configured, running the main bot only");
            None
        }
    };

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    let shared: Arc<dyn StorageAdapter> = storage.clone();

    let cancel = shutdown::install_signal_handler();
    let mut tasks = JoinSet::new();

    if let Some(channel) = main_channel {
        let concierge: Arc<dyn InboundHandler> = Arc::new(Concierge::new(
            Arc::clone(&shared),
            channel.clone(),
            Arc::new(SessionDirectory::new()),
            ConciergeSettings::from_config(&config),
        ));
        spawn_bot(&mut tasks, channel.clone(), concierge, cancel.clone());
        channels.push(channel);
    }

    if let Some(channel) = support_channel {
        let desk: Arc<dyn InboundHandler> =
            Arc::new(SupportDesk::new(Arc::clone(&shared), channel.clone()));
        spawn_bot(&mut tasks, channel.clone(), desk, cancel.clone());
        channels.push(channel);
    }

    if config.api.enabled {
        let api = config.api.clone();
        let state = ApiState::new(Arc::clone(&shared));
        let cancel = cancel.clone();
        tasks.spawn(async move { roamer_api::start_server(&api, state, cancel).await });
    }

    let mut outcome = Ok(());
    while let Some(joined) = tasks.join_next().await {
        // One task stopping takes the process down with it.
        cancel.cancel();
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "task failed");
                outcome = Err(e);
            }
            Err(e) => {
                error!(error = %e, "task panicked");
                outcome = Err(RoamerError::Internal(format!("task failed: {e}")));
            }
        }
    }

    for channel in &channels {
        if let Err(e) = channel.shutdown().await {
            warn!(channel = channel.name(), error = %e, "channel shutdown failed");
        }
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }

    info!("roamer shutdown complete");
    outcome
}

/// Runs only the listing API until a shutdown signal arrives.
pub async fn run_api(config: RoamerConfig) -> Result<(), RoamerError> {
    init_tracing(&config.bot.log_level);

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let cancel = shutdown::install_signal_handler();
    let state = ApiState::new(storage.clone());
    let outcome = roamer_api::start_server(&config.api, state, cancel).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    outcome
}

async fn connect(mut channel: TelegramChannel) -> Result<Arc<TelegramChannel>, RoamerError> {
    channel.connect().await?;
    Ok(Arc::new(channel))
}

fn spawn_bot(
    bots: &mut JoinSet<Result<(), RoamerError>>,
    channel: Arc<TelegramChannel>,
    handler: Arc<dyn InboundHandler>,
    cancel: CancellationToken,
) {
    bots.spawn(roamer_agent::run(channel, handler, cancel));
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("roamer={log_level},tower_http={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
