// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for Roamer.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide.
//! Private-chat messages and inline button presses are collected by a
//! long-polling dispatcher and queued for [`ChannelAdapter::receive`].
//! The same adapter serves the main bot and the support bot; only the
//! token and the channel name differ.

pub mod handler;

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use roamer_config::model::TelegramConfig;
use roamer_core::types::{InboundMessage, OutboundMessage};
use roamer_core::{AdapterType, ChannelAdapter, HealthStatus, MessageId, PluginAdapter, RoamerError};
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Channel name of the main tourist bot.
pub const MAIN_CHANNEL: &str = "telegram";

/// Channel name of the support bot.
pub const SUPPORT_CHANNEL: &str = "telegram-support";

const INBOUND_CAPACITY: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    name: String,
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    /// Creates an adapter named `name` for the bot with `token`.
    pub fn new(name: &str, token: Option<&str>) -> Result<Self, RoamerError> {
        let token = token.ok_or_else(|| {
            RoamerError::Config(format!("a bot token is required for the {name} channel"))
        })?;

        if token.trim().is_empty() {
            return Err(RoamerError::Config(format!(
                "the bot token for the {name} channel cannot be empty"
            )));
        }

        let bot = Bot::new(token.trim());
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        Ok(Self {
            name: name.to_string(),
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: Mutex::new(None),
        })
    }

    /// The main tourist bot, using `telegram.bot_token`.
    pub fn main_bot(config: &TelegramConfig) -> Result<Self, RoamerError> {
        Self::new(MAIN_CHANNEL, config.bot_token.as_deref())
    }

    /// The support bot, using `telegram.support_bot_token`.
    pub fn support_bot(config: &TelegramConfig) -> Result<Self, RoamerError> {
        Self::new(SUPPORT_CHANNEL, config.support_bot_token.as_deref())
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    fn take_polling_handle(&self) -> Option<JoinHandle<()>> {
        self.polling_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RoamerError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RoamerError> {
        debug!(channel = %self.name, "Telegram channel shutting down");
        if let Some(handle) = self.take_polling_handle() {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), RoamerError> {
        let slot = self
            .polling_handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();
        let message_channel = self.name.clone();
        let callback_channel = self.name.clone();

        info!(channel = %self.name, "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let on_message = Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                let channel = message_channel.clone();
                async move {
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }
                    match handler::message_to_inbound(&channel, &msg) {
                        Some(inbound) => {
                            if tx.send(inbound).await.is_err() {
                                warn!(channel = %channel, "inbound queue closed, dropping message");
                            }
                        }
                        None => debug!(msg_id = msg.id.0, "ignoring unsupported message type"),
                    }
                    respond(())
                }
            });

            let on_callback =
                Update::filter_callback_query().endpoint(move |bot: Bot, query: CallbackQuery| {
                    let tx = callback_tx.clone();
                    let channel = callback_channel.clone();
                    async move {
                        // Stops the client-side spinner on the pressed button.
                        if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
                            debug!(error = %e, "failed to answer callback query");
                        }
                        if let Some(inbound) = handler::callback_to_inbound(&channel, &query)
                            && tx.send(inbound).await.is_err()
                        {
                            warn!(channel = %channel, "inbound queue closed, dropping callback");
                        }
                        respond(())
                    }
                });

            let updates = dptree::entry().branch(on_message).branch(on_callback);

            Dispatcher::builder(bot, updates)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        *slot = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RoamerError> {
        let request = self.bot.send_message(ChatId(msg.recipient.0), msg.content);
        let request = match &msg.keyboard {
            Some(keyboard) => request.reply_markup(handler::to_reply_markup(keyboard)),
            None => request,
        };

        let sent = request.await.map_err(|e| RoamerError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn receive(&self) -> Result<InboundMessage, RoamerError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| RoamerError::channel_closed(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11";

    #[test]
    fn new_requires_bot_token() {
        let err = TelegramChannel::new(MAIN_CHANNEL, None).err().unwrap();
        assert!(matches!(err, RoamerError::Config(ref m) if m.contains("telegram")));
    }

    #[test]
    fn new_rejects_blank_token() {
        assert!(TelegramChannel::new(MAIN_CHANNEL, Some("  ")).is_err());
    }

    #[test]
    fn bots_take_their_own_token() {
        let config = TelegramConfig {
            bot_token: Some(TOKEN.into()),
            support_bot_token: None,
        };
        let main = TelegramChannel::main_bot(&config).unwrap();
        assert_eq!(main.name(), MAIN_CHANNEL);
        assert_eq!(main.adapter_type(), AdapterType::Channel);
        assert!(TelegramChannel::support_bot(&config).is_err());

        let config = TelegramConfig {
            bot_token: None,
            support_bot_token: Some(TOKEN.into()),
        };
        let support = TelegramChannel::support_bot(&config).unwrap();
        assert_eq!(support.name(), SUPPORT_CHANNEL);
    }

    #[tokio::test]
    async fn receive_reports_closed_queue() {
        let channel = TelegramChannel::new(SUPPORT_CHANNEL, Some(TOKEN)).unwrap();
        channel.inbound_rx.lock().await.close();
        let err = channel.receive().await.unwrap_err();
        assert!(err.is_channel_closed());
        assert!(err.to_string().contains(SUPPORT_CHANNEL));
    }

    #[tokio::test]
    async fn shutdown_without_connect_is_a_no_op() {
        let channel = TelegramChannel::new(MAIN_CHANNEL, Some(TOKEN)).unwrap();
        channel.shutdown().await.unwrap();
    }
}
