// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `roamer admin` command implementation.
//!
//! Operator tooling for the data the bots cannot create on their own
//! (role assignments, the location catalogue) and for reading archived
//! conversations.

use clap::Subcommand;
use roamer_config::model::RoamerConfig;
use roamer_core::types::{ChatMessage, NewLocation, User};
use roamer_core::{ExternalId, LocationId, ReservationId, Role, RoamerError, StorageAdapter};
use roamer_storage::SqliteStorage;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Change the role of a user who has already contacted a bot.
    SetRole {
        /// Telegram user id.
        external_id: i64,
        /// requester, provider or support.
        role: Role,
    },
    /// Add a location to the catalogue.
    AddLocation {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value_t = 0.0)]
        rating: f64,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Telegram user id of the owning provider.
        #[arg(long)]
        provider: Option<i64>,
    },
    /// Print archived messages of a reservation chat or a user's support thread.
    #[command(group(clap::ArgGroup::new("thread").required(true).args(["reservation", "user"])))]
    History {
        /// Reservation id.
        #[arg(long)]
        reservation: Option<i64>,
        /// Telegram user id whose support thread to print.
        #[arg(long)]
        user: Option<i64>,
    },
}

/// Which archived conversation to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thread {
    Reservation(ReservationId),
    Support(ExternalId),
}

/// Runs an admin command against the configured database.
pub async fn run_admin(config: &RoamerConfig, command: AdminCommand) -> Result<(), RoamerError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;

    let result = match command {
        AdminCommand::SetRole { external_id, role } => {
            set_role(&storage, ExternalId(external_id), role)
                .await
                .map(|user| {
                    println!("user #{} ({}) is now {}", user.id, user.first_name, user.role);
                })
        }
        AdminCommand::AddLocation {
            name,
            description,
            category,
            region,
            rating,
            latitude,
            longitude,
            provider,
        } => {
            let location = NewLocation {
                name,
                description,
                category,
                region,
                rating,
                latitude,
                longitude,
                provider_id: None,
            };
            add_location(&storage, location, provider.map(ExternalId))
                .await
                .map(|id| println!("location #{id} added"))
        }
        AdminCommand::History { reservation, user } => {
            let thread = match (reservation, user) {
                (Some(id), _) => Thread::Reservation(ReservationId(id)),
                (None, Some(id)) => Thread::Support(ExternalId(id)),
                (None, None) => {
                    return Err(RoamerError::Config(
                        "history needs --reservation or --user".into(),
                    ));
                }
            };
            history(&storage, thread).await.map(|messages| {
                for message in &messages {
                    println!("{}", format_message(message));
                }
                if messages.is_empty() {
                    println!("no messages");
                }
            })
        }
    };

    storage.close().await?;
    result
}

/// Assigns `role` to the user known by `external_id`.
pub async fn set_role(
    storage: &dyn StorageAdapter,
    external_id: ExternalId,
    role: Role,
) -> Result<User, RoamerError> {
    let mut user = storage
        .get_user_by_external_id(external_id)
        .await?
        .ok_or_else(|| RoamerError::not_found("user", external_id))?;
    storage.set_user_role(user.id, role).await?;
    info!(user_id = %user.id, from = %user.role, to = %role, "role changed");
    user.role = role;
    Ok(user)
}

/// Inserts a location, promoting its owner to provider when needed.
pub async fn add_location(
    storage: &dyn StorageAdapter,
    mut location: NewLocation,
    provider: Option<ExternalId>,
) -> Result<LocationId, RoamerError> {
    if location.name.trim().is_empty() {
        return Err(RoamerError::Config("location name cannot be empty".into()));
    }
    if let Some(external_id) = provider {
        let owner = set_role(storage, external_id, Role::Provider).await?;
        location.provider_id = Some(owner.id);
    }
    let id = storage.insert_location(&location).await?;
    info!(location_id = %id, name = %location.name, "location added");
    Ok(id)
}

/// Archived messages of `thread`, oldest first.
pub async fn history(
    storage: &dyn StorageAdapter,
    thread: Thread,
) -> Result<Vec<ChatMessage>, RoamerError> {
    match thread {
        Thread::Reservation(id) => {
            storage
                .get_reservation(id)
                .await?
                .ok_or_else(|| RoamerError::not_found("reservation", id))?;
            storage.list_reservation_messages(id).await
        }
        Thread::Support(external_id) => {
            let user = storage
                .get_user_by_external_id(external_id)
                .await?
                .ok_or_else(|| RoamerError::not_found("user", external_id))?;
            storage.list_support_messages(user.id).await
        }
    }
}

fn format_message(message: &ChatMessage) -> String {
    let to = message
        .to_user_id
        .map_or_else(|| "support".to_string(), |id| format!("#{id}"));
    format!(
        "[{}] #{} -> {}: {}",
        message.created_at, message.from_user_id, to, message.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roamer_config::model::StorageConfig;
    use roamer_core::types::{ContactProfile, NewChatMessage};

    async fn storage(dir: &tempfile::TempDir) -> SqliteStorage {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("admin.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        storage
    }

    fn profile(external_id: i64, first_name: &str) -> ContactProfile {
        ContactProfile {
            external_id: ExternalId(external_id),
            first_name: first_name.into(),
            ..ContactProfile::default()
        }
    }

    #[tokio::test]
    async fn set_role_requires_known_user() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;

        let err = set_role(&storage, ExternalId(77), Role::Support).await.unwrap_err();
        assert!(matches!(err, RoamerError::NotFound { entity: "user", .. }));

        storage.resolve_or_create_user(&profile(77, "Sam")).await.unwrap();
        let user = set_role(&storage, ExternalId(77), Role::Support).await.unwrap();
        assert_eq!(user.role, Role::Support);
        let stored = storage.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Support);
    }

    #[tokio::test]
    async fn owner_becomes_provider() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let pat = storage.resolve_or_create_user(&profile(5, "Pat")).await.unwrap();

        let location = NewLocation {
            name: "Lighthouse".into(),
            latitude: 43.0,
            longitude: 131.9,
            ..NewLocation::default()
        };
        let id = add_location(&storage, location, Some(ExternalId(5))).await.unwrap();

        let stored = storage.get_location(id).await.unwrap().unwrap();
        assert_eq!(stored.provider_id, Some(pat.id));
        assert_eq!(storage.get_user(pat.id).await.unwrap().unwrap().role, Role::Provider);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let err = add_location(&storage, NewLocation::default(), None).await.unwrap_err();
        assert!(matches!(err, RoamerError::Config(_)));
    }

    #[tokio::test]
    async fn history_reads_both_threads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir).await;
        let rita = storage.resolve_or_create_user(&profile(1, "Rita")).await.unwrap();
        let pat = storage.resolve_or_create_user(&profile(2, "Pat")).await.unwrap();
        let inn = add_location(
            &storage,
            NewLocation {
                name: "Inn".into(),
                ..NewLocation::default()
            },
            Some(ExternalId(2)),
        )
        .await
        .unwrap();
        let reservation = storage.create_reservation(rita.id, inn, "tonight").await.unwrap();

        storage
            .insert_chat_message(&NewChatMessage {
                from_user_id: rita.id,
                to_user_id: Some(pat.id),
                reservation_id: Some(reservation),
                content: "Late check-in?".into(),
                is_support: false,
            })
            .await
            .unwrap();
        storage
            .insert_chat_message(&NewChatMessage {
                from_user_id: rita.id,
                to_user_id: None,
                reservation_id: None,
                content: "Lost my key".into(),
                is_support: true,
            })
            .await
            .unwrap();

        let chat = history(&storage, Thread::Reservation(reservation)).await.unwrap();
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].content, "Late check-in?");
        let expected = format!("#{} -> #{}: Late check-in?", rita.id, pat.id);
        assert!(format_message(&chat[0]).ends_with(&expected));

        let support = history(&storage, Thread::Support(ExternalId(1))).await.unwrap();
        assert_eq!(support.len(), 1);
        assert!(format_message(&support[0]).ends_with("-> support: Lost my key"));

        let err = history(&storage, Thread::Reservation(ReservationId(999))).await.unwrap_err();
        assert!(matches!(err, RoamerError::NotFound { entity: "reservation", .. }));
        let err = history(&storage, Thread::Support(ExternalId(42))).await.unwrap_err();
        assert!(matches!(err, RoamerError::NotFound { entity: "user", .. }));
    }
}
