// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use roamer_config::model::StorageConfig;
use roamer_core::types::{
    ChatMessage, ContactProfile, Location, LocationPhoto, LocationQuery, NewChatMessage,
    NewLocation, Reservation, Trip, TripLocation, User,
};
use roamer_core::{
    AdapterType, ExternalId, HealthStatus, LocationId, PluginAdapter, ReservationId,
    ReservationStatus, Role, RoamerError, StorageAdapter, TripId, UserId,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// The database is opened on the first call to
/// [`StorageAdapter::initialize`]; every other method fails with
/// [`RoamerError::Storage`] until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, RoamerError> {
        self.db.get().ok_or_else(|| RoamerError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(db: &Database) -> Result<(), RoamerError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(crate::database::map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    /// Degraded when WAL was requested but SQLite runs another journal mode.
    async fn health_check(&self) -> Result<HealthStatus, RoamerError> {
        let db = self.db()?;
        let journal_mode = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        if self.config.wal_mode && !journal_mode.eq_ignore_ascii_case("wal") {
            return Ok(HealthStatus::Degraded(format!(
                "journal mode is {journal_mode}, expected wal"
            )));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RoamerError> {
        if let Some(db) = self.db.get() {
            Self::checkpoint(db).await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), RoamerError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RoamerError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), RoamerError> {
        Self::checkpoint(self.db()?).await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Identities ---

    async fn resolve_or_create_user(&self, profile: &ContactProfile) -> Result<User, RoamerError> {
        queries::users::resolve_or_create_user(self.db()?, profile).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RoamerError> {
        queries::users::get_user(self.db()?, id).await
    }

    async fn get_user_by_external_id(&self, id: ExternalId) -> Result<Option<User>, RoamerError> {
        queries::users::get_user_by_external_id(self.db()?, id).await
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, RoamerError> {
        queries::users::list_users_by_role(self.db()?, role).await
    }

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<(), RoamerError> {
        queries::users::set_user_role(self.db()?, id, role).await
    }

    // --- Locations ---

    async fn insert_location(&self, location: &NewLocation) -> Result<LocationId, RoamerError> {
        queries::locations::insert_location(self.db()?, location).await
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>, RoamerError> {
        queries::locations::get_location(self.db()?, id).await
    }

    async fn search_locations(&self, query: &LocationQuery) -> Result<Vec<Location>, RoamerError> {
        queries::locations::search_locations(self.db()?, query).await
    }

    async fn add_location_photo(
        &self,
        location: LocationId,
        file_id: &str,
    ) -> Result<(), RoamerError> {
        queries::locations::add_location_photo(self.db()?, location, file_id).await
    }

    async fn list_location_photos(
        &self,
        location: LocationId,
    ) -> Result<Vec<LocationPhoto>, RoamerError> {
        queries::locations::list_location_photos(self.db()?, location).await
    }

    // --- Reservations ---

    async fn create_reservation(
        &self,
        user: UserId,
        location: LocationId,
        details: &str,
    ) -> Result<ReservationId, RoamerError> {
        queries::reservations::create_reservation(self.db()?, user, location, details).await
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>, RoamerError> {
        queries::reservations::get_reservation(self.db()?, id).await
    }

    async fn transition_reservation(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<bool, RoamerError> {
        queries::reservations::transition_reservation(self.db()?, id, status).await
    }

    async fn list_provider_reservations(
        &self,
        provider: UserId,
    ) -> Result<Vec<Reservation>, RoamerError> {
        queries::reservations::list_provider_reservations(self.db()?, provider).await
    }

    async fn latest_open_reservation(
        &self,
        user: UserId,
        location: LocationId,
    ) -> Result<Option<Reservation>, RoamerError> {
        queries::reservations::latest_open_reservation(self.db()?, user, location).await
    }

    // --- Trips ---

    async fn create_trip(&self, user: UserId, name: &str) -> Result<TripId, RoamerError> {
        queries::trips::create_trip(self.db()?, user, name).await
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<Trip>, RoamerError> {
        queries::trips::get_trip(self.db()?, id).await
    }

    async fn latest_trip(&self, user: UserId) -> Result<Option<Trip>, RoamerError> {
        queries::trips::latest_trip(self.db()?, user).await
    }

    async fn add_trip_location(
        &self,
        trip: TripId,
        location: LocationId,
    ) -> Result<Option<i64>, RoamerError> {
        queries::trips::add_trip_location(self.db()?, trip, location).await
    }

    async fn trip_locations(&self, trip: TripId) -> Result<Vec<Location>, RoamerError> {
        queries::trips::trip_locations(self.db()?, trip).await
    }

    async fn trip_links(&self, trip: TripId) -> Result<Vec<TripLocation>, RoamerError> {
        queries::trips::trip_links(self.db()?, trip).await
    }

    async fn reorder_trip(&self, trip: TripId, order: &[LocationId]) -> Result<(), RoamerError> {
        queries::trips::reorder_trip(self.db()?, trip, order).await
    }

    // --- Chat messages ---

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<i64, RoamerError> {
        queries::messages::insert_chat_message(self.db()?, message).await
    }

    async fn list_reservation_messages(
        &self,
        reservation: ReservationId,
    ) -> Result<Vec<ChatMessage>, RoamerError> {
        queries::messages::list_reservation_messages(self.db()?, reservation).await
    }

    async fn list_support_messages(&self, user: UserId) -> Result<Vec<ChatMessage>, RoamerError> {
        queries::messages::list_support_messages(self.db()?, user).await
    }

    // --- Offer subscriptions ---

    async fn subscribe_offers(&self, user: UserId) -> Result<(), RoamerError> {
        queries::subscriptions::subscribe_offers(self.db()?, user).await
    }

    async fn unsubscribe_offers(&self, user: UserId) -> Result<(), RoamerError> {
        queries::subscriptions::unsubscribe_offers(self.db()?, user).await
    }

    async fn subscriber_handles(&self) -> Result<Vec<ExternalId>, RoamerError> {
        queries::subscriptions::subscriber_handles(self.db()?).await
    }
}
