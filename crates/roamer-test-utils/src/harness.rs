// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles both bots over one temp SQLite database and one
//! session directory, each bot talking to its own [`MockChannel`]. Helpers
//! register users and locations and drive updates straight into the
//! handlers, so a test observes replies as soon as the call returns.

use std::sync::Arc;

use roamer_agent::{Concierge, ConciergeSettings, InboundHandler, SessionDirectory, SupportDesk};
use roamer_config::model::StorageConfig;
use roamer_core::types::{
    ContactProfile, InboundMessage, MessageContent, NewLocation, OutboundMessage, User,
};
use roamer_core::{ExternalId, LocationId, Role, RoamerError, StorageAdapter};
use roamer_storage::SqliteStorage;

use crate::mock_channel::MockChannel;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    settings: ConciergeSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            settings: ConciergeSettings::default(),
        }
    }

    /// Cap the number of search hits shown.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.settings.max_results = max_results;
        self
    }

    /// Name given to trips created without an explicit name.
    pub fn with_default_trip_name(mut self, name: &str) -> Self {
        self.settings.default_trip_name = name.to_string();
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RoamerError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RoamerError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let directory = Arc::new(SessionDirectory::new());
        let main_channel = Arc::new(MockChannel::named("telegram"));
        let support_channel = Arc::new(MockChannel::named("telegram-support"));

        let concierge = Arc::new(Concierge::new(
            Arc::clone(&storage),
            main_channel.clone(),
            Arc::clone(&directory),
            self.settings,
        ));
        let support_desk = Arc::new(SupportDesk::new(
            Arc::clone(&storage),
            support_channel.clone(),
        ));

        Ok(TestHarness {
            storage,
            directory,
            main_channel,
            support_channel,
            concierge,
            support_desk,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock channels and temp storage.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// Pairing table shared by both bots.
    pub directory: Arc<SessionDirectory>,
    /// Channel of the main bot.
    pub main_channel: Arc<MockChannel>,
    /// Channel of the support bot.
    pub support_channel: Arc<MockChannel>,
    pub concierge: Arc<Concierge>,
    pub support_desk: Arc<SupportDesk>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register an identity and assign `role` out of band.
    pub async fn user(
        &self,
        external_id: i64,
        first_name: &str,
        role: Role,
    ) -> Result<User, RoamerError> {
        let user = self
            .storage
            .resolve_or_create_user(&ContactProfile {
                external_id: ExternalId(external_id),
                username: first_name.to_lowercase(),
                first_name: first_name.to_string(),
                last_name: String::new(),
            })
            .await?;
        if user.role == role {
            return Ok(user);
        }
        self.storage.set_user_role(user.id, role).await?;
        Ok(User { role, ..user })
    }

    /// Insert a location, optionally owned by `provider`.
    pub async fn location(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
        provider: Option<&User>,
    ) -> Result<LocationId, RoamerError> {
        self.storage
            .insert_location(&NewLocation {
                name: name.to_string(),
                description: format!("{name} description"),
                category: "sight".to_string(),
                region: "coast".to_string(),
                rating: 4.5,
                latitude,
                longitude,
                provider_id: provider.map(|p| p.id),
            })
            .await
    }

    /// Build an inbound update as the platform would deliver it.
    pub fn inbound(from: &User, channel: &str, content: MessageContent) -> InboundMessage {
        InboundMessage {
            channel: channel.to_string(),
            sender: ContactProfile {
                external_id: from.external_id,
                username: from.username.clone(),
                first_name: from.first_name.clone(),
                last_name: from.last_name.clone(),
            },
            content,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Text (or a command) sent to the main bot.
    pub async fn send_text(&self, from: &User, text: &str) -> Result<(), RoamerError> {
        self.concierge
            .handle(Self::inbound(
                from,
                "telegram",
                MessageContent::Text(text.to_string()),
            ))
            .await
    }

    /// Inline button pressed in the main bot.
    pub async fn press(&self, from: &User, data: impl ToString) -> Result<(), RoamerError> {
        self.concierge
            .handle(Self::inbound(
                from,
                "telegram",
                MessageContent::Callback(data.to_string()),
            ))
            .await
    }

    /// Photo sent to the main bot.
    pub async fn send_photo(&self, from: &User, file_id: &str) -> Result<(), RoamerError> {
        self.concierge
            .handle(Self::inbound(
                from,
                "telegram",
                MessageContent::Photo {
                    file_id: file_id.to_string(),
                    caption: None,
                },
            ))
            .await
    }

    /// Text sent to the support bot.
    pub async fn support_text(&self, from: &User, text: &str) -> Result<(), RoamerError> {
        self.support_desk
            .handle(Self::inbound(
                from,
                "telegram-support",
                MessageContent::Text(text.to_string()),
            ))
            .await
    }

    /// Messages the main bot sent to `user`.
    pub async fn sent_to(&self, user: &User) -> Vec<OutboundMessage> {
        self.main_channel.sent_to(user.external_id).await
    }

    /// Last text the main bot sent to `user`, or an empty string.
    pub async fn last_reply(&self, user: &User) -> String {
        self.main_channel
            .last_text_to(user.external_id)
            .await
            .unwrap_or_default()
    }

    /// Last text the support bot sent to `user`, or an empty string.
    pub async fn last_support_reply(&self, user: &User) -> String {
        self.support_channel
            .last_text_to(user.external_id)
            .await
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(harness.storage.subscriber_handles().await.unwrap().is_empty());
        assert!(harness.directory.is_empty());
    }

    #[tokio::test]
    async fn users_get_requested_role() {
        let harness = TestHarness::builder().build().await.unwrap();
        let pat = harness.user(2, "Pat", Role::Provider).await.unwrap();
        assert_eq!(pat.role, Role::Provider);
        let stored = harness
            .storage
            .get_user_by_external_id(ExternalId(2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.role, Role::Provider);
    }

    #[tokio::test]
    async fn start_replies_with_menu() {
        let harness = TestHarness::builder().build().await.unwrap();
        let rita = harness.user(1, "Rita", Role::Requester).await.unwrap();
        harness.send_text(&rita, "/start").await.unwrap();

        let sent = harness.sent_to(&rita).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, "Hello, Rita! Choose an action:");
        assert!(sent[0].keyboard.is_some());
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        let rita = h1.user(1, "Rita", Role::Requester).await.unwrap();
        h1.send_text(&rita, "/subscribe_offers").await.unwrap();
        assert_eq!(h1.storage.subscriber_handles().await.unwrap().len(), 1);
        assert!(h2.storage.subscriber_handles().await.unwrap().is_empty());
    }
}
