// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for messaging platform integrations.

use async_trait::async_trait;

use crate::error::RoamerError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Adapter for a bidirectional messaging channel.
///
/// Outbound delivery is fire-and-forget from the orchestration layer's point
/// of view: a failed `send` is logged by the caller and never rolls back
/// reservation or pairing state.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), RoamerError>;

    /// Sends a message through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RoamerError>;

    /// Receives the next inbound update from the channel.
    async fn receive(&self) -> Result<InboundMessage, RoamerError>;
}
