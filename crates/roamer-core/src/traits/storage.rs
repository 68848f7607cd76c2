// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the persistence backend.

use async_trait::async_trait;

use crate::error::RoamerError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ChatMessage, ContactProfile, ExternalId, Location, LocationId, LocationPhoto, LocationQuery,
    NewChatMessage, NewLocation, Reservation, ReservationId, ReservationStatus, Role, Trip,
    TripId, TripLocation, User, UserId,
};

/// Adapter for the persistence backend.
///
/// Lookups return `Ok(None)` for unknown ids; turning that into
/// [`RoamerError::NotFound`] is the caller's decision. Every method that
/// writes more than one row does so in a single transaction.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), RoamerError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RoamerError>;

    // --- Identities ---

    /// Returns the identity for `profile.external_id`, creating it with the
    /// requester role on first contact.
    async fn resolve_or_create_user(&self, profile: &ContactProfile)
    -> Result<User, RoamerError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RoamerError>;

    async fn get_user_by_external_id(&self, id: ExternalId)
    -> Result<Option<User>, RoamerError>;

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, RoamerError>;

    /// Out-of-band role assignment (operator tooling, tests).
    async fn set_user_role(&self, id: UserId, role: Role) -> Result<(), RoamerError>;

    // --- Locations ---

    async fn insert_location(&self, location: &NewLocation) -> Result<LocationId, RoamerError>;

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>, RoamerError>;

    async fn search_locations(&self, query: &LocationQuery)
    -> Result<Vec<Location>, RoamerError>;

    async fn add_location_photo(
        &self,
        location: LocationId,
        file_id: &str,
    ) -> Result<(), RoamerError>;

    async fn list_location_photos(
        &self,
        location: LocationId,
    ) -> Result<Vec<LocationPhoto>, RoamerError>;

    // --- Reservations ---

    /// Inserts a reservation in the pending state.
    async fn create_reservation(
        &self,
        user: UserId,
        location: LocationId,
        details: &str,
    ) -> Result<ReservationId, RoamerError>;

    async fn get_reservation(&self, id: ReservationId)
    -> Result<Option<Reservation>, RoamerError>;

    /// Moves a pending reservation to `status`.
    ///
    /// Returns `false` without writing when the reservation is missing or no
    /// longer pending; a terminal row is never overwritten.
    async fn transition_reservation(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<bool, RoamerError>;

    /// Reservations against locations owned by `provider`, newest first.
    async fn list_provider_reservations(
        &self,
        provider: UserId,
    ) -> Result<Vec<Reservation>, RoamerError>;

    /// The newest reservation `user` holds on `location` that was not rejected.
    async fn latest_open_reservation(
        &self,
        user: UserId,
        location: LocationId,
    ) -> Result<Option<Reservation>, RoamerError>;

    // --- Trips ---

    async fn create_trip(&self, user: UserId, name: &str) -> Result<TripId, RoamerError>;

    async fn get_trip(&self, id: TripId) -> Result<Option<Trip>, RoamerError>;

    /// The most recently created trip of `user`.
    async fn latest_trip(&self, user: UserId) -> Result<Option<Trip>, RoamerError>;

    /// Appends `location` at the end of the trip. Returns the assigned order
    /// index, or `None` when the location is already part of the trip.
    async fn add_trip_location(
        &self,
        trip: TripId,
        location: LocationId,
    ) -> Result<Option<i64>, RoamerError>;

    /// Locations of a trip in their current order.
    async fn trip_locations(&self, trip: TripId) -> Result<Vec<Location>, RoamerError>;

    /// Raw trip-location links in their current order.
    async fn trip_links(&self, trip: TripId) -> Result<Vec<TripLocation>, RoamerError>;

    /// Rewrites the order of every link of `trip` so that `order[i]` gets
    /// index `i + 1`.
    ///
    /// `order` must name every location of the trip exactly once. The whole
    /// batch commits or rolls back together.
    async fn reorder_trip(&self, trip: TripId, order: &[LocationId]) -> Result<(), RoamerError>;

    // --- Chat messages ---

    async fn insert_chat_message(&self, message: &NewChatMessage) -> Result<i64, RoamerError>;

    async fn list_reservation_messages(
        &self,
        reservation: ReservationId,
    ) -> Result<Vec<ChatMessage>, RoamerError>;

    /// Support-channel messages sent by or to `user`, oldest first.
    async fn list_support_messages(&self, user: UserId)
    -> Result<Vec<ChatMessage>, RoamerError>;

    // --- Offer subscriptions ---

    /// Idempotent.
    async fn subscribe_offers(&self, user: UserId) -> Result<(), RoamerError>;

    async fn unsubscribe_offers(&self, user: UserId) -> Result<(), RoamerError>;

    async fn subscriber_handles(&self) -> Result<Vec<ExternalId>, RoamerError>;
}
