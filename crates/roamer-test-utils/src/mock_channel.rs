// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound updates
//! and captured outbound messages for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use roamer_core::traits::adapter::PluginAdapter;
use roamer_core::traits::channel::ChannelAdapter;
use roamer_core::types::{InboundMessage, MessageId, OutboundMessage};
use roamer_core::{AdapterType, ExternalId, HealthStatus, RoamerError};

/// A mock messaging channel for testing.
///
/// Provides two queues:
/// - **inbound**: updates injected via `inject_message()` are returned by `receive()`
/// - **sent**: messages passed to `send()` are captured and retrievable via `sent_messages()`
///
/// Once [`close`](Self::close) is called, `receive()` reports a closed channel
/// after the queue drains. With [`fail_sends`](Self::fail_sends) every `send()`
/// fails without capturing the message.
pub struct MockChannel {
    name: String,
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    closed: AtomicBool,
    failing: AtomicBool,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self::named("mock-channel")
    }

    /// Create a mock channel reporting `name` from [`PluginAdapter::name`].
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            failing: AtomicBool::new(false),
        }
    }

    /// Inject an inbound update into the receive queue.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// End the inbound stream once the queued updates are consumed.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Make every subsequent `send()` fail (or succeed again).
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all messages that were sent through `send()`.
    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one recipient, in order.
    pub async fn sent_to(&self, recipient: ExternalId) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.recipient == recipient)
            .cloned()
            .collect()
    }

    /// Text of the last message sent to `recipient`, if any.
    pub async fn last_text_to(&self, recipient: ExternalId) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .map(|m| m.content.clone())
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Clear all sent messages.
    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
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
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RoamerError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), RoamerError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RoamerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoamerError::Channel {
                message: format!("delivery to {} failed", msg.recipient),
                source: None,
            });
        }
        let id = format!("mock-msg-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(msg);
        Ok(MessageId(id))
    }

    async fn receive(&self) -> Result<InboundMessage, RoamerError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(RoamerError::channel_closed(&self.name));
            }
            // Wait for notification that a new update was injected.
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roamer_core::types::{ContactProfile, MessageContent};

    fn make_inbound(text: &str) -> InboundMessage {
        InboundMessage {
            channel: "mock".to_string(),
            sender: ContactProfile {
                external_id: ExternalId(1),
                first_name: "Test".to_string(),
                ..ContactProfile::default()
            },
            content: MessageContent::Text(text.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn receive_returns_injected_messages_in_order() {
        let channel = MockChannel::new();
        channel.inject_message(make_inbound("first")).await;
        channel.inject_message(make_inbound("second")).await;

        for expected in ["first", "second"] {
            let received = channel.receive().await.unwrap();
            assert_eq!(received.sender.external_id, ExternalId(1));
            assert_eq!(received.content, MessageContent::Text(expected.into()));
        }
    }

    #[tokio::test]
    async fn send_captures_outbound_messages() {
        let channel = MockChannel::new();
        let msg_id = channel
            .send(OutboundMessage::text(ExternalId(5), "response text"))
            .await
            .unwrap();
        assert!(msg_id.0.starts_with("mock-msg-"));

        channel
            .send(OutboundMessage::text(ExternalId(6), "other"))
            .await
            .unwrap();
        assert_eq!(channel.sent_count().await, 2);
        assert_eq!(channel.sent_to(ExternalId(5)).await.len(), 1);
        assert_eq!(
            channel.last_text_to(ExternalId(6)).await.as_deref(),
            Some("other")
        );

        channel.clear_sent().await;
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn failing_sends_are_not_captured() {
        let channel = MockChannel::new();
        channel.fail_sends(true);
        assert!(
            channel
                .send(OutboundMessage::text(ExternalId(5), "lost"))
                .await
                .is_err()
        );
        assert_eq!(channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn receive_waits_for_injection() {
        let channel = Arc::new(MockChannel::new());
        let channel_clone = channel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            channel_clone.inject_message(make_inbound("delayed")).await;
        });

        let received = tokio::time::timeout(tokio::time::Duration::from_secs(2), channel.receive())
            .await
            .expect("receive timed out")
            .unwrap();
        assert_eq!(received.content, MessageContent::Text("delayed".into()));
    }

    #[tokio::test]
    async fn close_drains_then_reports_closed() {
        let channel = MockChannel::named("telegram-support");
        channel.inject_message(make_inbound("last")).await;
        channel.close();

        assert!(channel.receive().await.is_ok());
        let err = channel.receive().await.unwrap_err();
        assert!(err.is_channel_closed());
        assert_eq!(channel.name(), "telegram-support");
    }
}
