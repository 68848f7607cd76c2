// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The support bot.
//!
//! Requests from ordinary users are archived and forwarded to every support
//! operator; operators answer with `/answer <user id> <text>`.

use std::sync::Arc;

use async_trait::async_trait;
use roamer_core::types::{InboundMessage, MessageContent, NewChatMessage, OutboundMessage, User};
use roamer_core::{ChannelAdapter, Role, RoamerError, StorageAdapter, UserId};
use tracing::{debug, info};

use crate::{InboundHandler, deliver, user_facing};

pub struct SupportDesk {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
}

impl SupportDesk {
    pub fn new(storage: Arc<dyn StorageAdapter>, channel: Arc<dyn ChannelAdapter>) -> Self {
        Self { storage, channel }
    }

    async fn reply(&self, to: &User, text: impl Into<String>) {
        deliver(self.channel.as_ref(), OutboundMessage::text(to.external_id, text)).await;
    }

    async fn on_text(&self, user: &User, text: &str) -> Result<(), RoamerError> {
        let text = text.trim();
        if let Some(body) = text.strip_prefix('/') {
            let (head, args) = body.split_once(' ').unwrap_or((body, ""));
            let name = head.split_once('@').map_or(head, |(name, _)| name);
            return match name {
                "start" => {
                    self.greet(user).await;
                    Ok(())
                }
                "answer" => self.answer(user, args.trim()).await,
                other => {
                    self.reply(user, format!("Unknown command /{other}.")).await;
                    Ok(())
                }
            };
        }

        if user.role == Role::Support {
            self.reply(user, "Use /answer <user id> <text> to reply to a request.")
                .await;
            return Ok(());
        }
        self.forward_request(user, text).await
    }

    async fn greet(&self, user: &User) {
        let text = if user.role == Role::Support {
            format!("Hello, {}! You are on duty. Waiting for requests...", user.first_name)
        } else {
            format!(
                "Hello, {}! Describe your question and a support operator will answer soon.",
                user.first_name
            )
        };
        self.reply(user, text).await;
    }

    /// Operator reply to a user, addressed by internal user id.
    async fn answer(&self, operator: &User, args: &str) -> Result<(), RoamerError> {
        if operator.role != Role::Support {
            return Err(RoamerError::Unauthorized {
                action: "answer support requests".to_string(),
            });
        }
        let Some((id, text)) = args
            .split_once(' ')
            .map(|(id, text)| (id, text.trim()))
            .filter(|(_, text)| !text.is_empty())
        else {
            self.reply(operator, "Usage: /answer <user id> <text>").await;
            return Ok(());
        };
        let Ok(id) = id.parse::<UserId>() else {
            self.reply(operator, "Invalid user id.").await;
            return Ok(());
        };
        let Some(recipient) = self.storage.get_user(id).await? else {
            self.reply(operator, "User not found.").await;
            return Ok(());
        };

        deliver(
            self.channel.as_ref(),
            OutboundMessage::text(recipient.external_id, format!("Support reply: {text}")),
        )
        .await;
        self.storage
            .insert_chat_message(&NewChatMessage {
                from_user_id: operator.id,
                to_user_id: Some(recipient.id),
                reservation_id: None,
                content: text.to_string(),
                is_support: true,
            })
            .await?;
        info!(operator = operator.id.0, recipient = recipient.id.0, "support answer sent");
        self.reply(operator, "Answer sent.").await;
        Ok(())
    }

    async fn forward_request(&self, user: &User, text: &str) -> Result<(), RoamerError> {
        self.storage
            .insert_chat_message(&NewChatMessage {
                from_user_id: user.id,
                to_user_id: None,
                reservation_id: None,
                content: text.to_string(),
                is_support: true,
            })
            .await?;

        let operators = self.storage.list_users_by_role(Role::Support).await?;
        if operators.is_empty() {
            self.reply(user, "No operators available.").await;
            return Ok(());
        }
        let forwarded = format!(
            "Request from {} (ID {}):\n{}",
            user.first_name, user.id, text
        );
        for operator in &operators {
            deliver(
                self.channel.as_ref(),
                OutboundMessage::text(operator.external_id, forwarded.clone()),
            )
            .await;
        }
        debug!(user = user.id.0, operators = operators.len(), "support request forwarded");
        self.reply(user, "Your request was sent to support.").await;
        Ok(())
    }
}

#[async_trait]
impl InboundHandler for SupportDesk {
    async fn handle(&self, msg: InboundMessage) -> Result<(), RoamerError> {
        let user = self.storage.resolve_or_create_user(&msg.sender).await?;
        let result = match msg.content {
            MessageContent::Text(text) => self.on_text(&user, &text).await,
            MessageContent::Photo { .. } => {
                self.reply(&user, "Please describe your request in text.")
                    .await;
                Ok(())
            }
            MessageContent::Callback(data) => {
                debug!(user = user.id.0, data = data.as_str(), "ignoring callback");
                Ok(())
            }
        };
        match result {
            Err(e) if e.is_recoverable() => {
                self.reply(&user, user_facing(&e)).await;
                Ok(())
            }
            Err(e) => {
                self.reply(&user, user_facing(&e)).await;
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }
}
