// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The main bot: search, trips, reservations and reservation-scoped chat.
//!
//! Text from a sender is tried, in order, as a command or menu label, as
//! the follow-up the sender was asked for, as chat to a paired partner, and
//! finally as a location search keyword.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use roamer_config::RoamerConfig;
use roamer_core::types::{
    InboundMessage, Location, LocationQuery, MessageContent, NewChatMessage, OutboundMessage,
    User,
};
use roamer_core::{
    ChannelAdapter, LocationId, ReservationId, Role, RoamerError, StorageAdapter, UserId,
};
use tracing::{debug, info, warn};

use crate::awaiting::{AwaitingInput, AwaitingInputs};
use crate::command::{CallbackAction, Command};
use crate::directory::{Pairing, SessionDirectory};
use crate::ledger::{Decision, ReservationLedger};
use crate::route::{StopOutcome, TripPlanner};
use crate::{InboundHandler, deliver, menu, user_facing};

/// Knobs of the main bot taken from configuration.
#[derive(Debug, Clone)]
pub struct ConciergeSettings {
    pub default_trip_name: String,
    pub support_handle: String,
    pub max_results: usize,
    pub label_max_chars: usize,
}

impl ConciergeSettings {
    pub fn from_config(config: &RoamerConfig) -> Self {
        Self {
            default_trip_name: config.bot.default_trip_name.clone(),
            support_handle: config.bot.support_handle.clone(),
            max_results: config.search.max_results,
            label_max_chars: config.search.label_max_chars,
        }
    }
}

impl Default for ConciergeSettings {
    fn default() -> Self {
        Self::from_config(&RoamerConfig::default())
    }
}

pub struct Concierge {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn ChannelAdapter>,
    directory: Arc<SessionDirectory>,
    awaiting: AwaitingInputs,
    ledger: ReservationLedger,
    planner: TripPlanner,
    settings: ConciergeSettings,
}

impl Concierge {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn ChannelAdapter>,
        directory: Arc<SessionDirectory>,
        settings: ConciergeSettings,
    ) -> Self {
        Self {
            ledger: ReservationLedger::new(Arc::clone(&storage)),
            planner: TripPlanner::new(Arc::clone(&storage), settings.default_trip_name.clone()),
            awaiting: AwaitingInputs::new(),
            storage,
            channel,
            directory,
            settings,
        }
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    pub fn awaiting(&self) -> &AwaitingInputs {
        &self.awaiting
    }

    pub fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    pub fn planner(&self) -> &TripPlanner {
        &self.planner
    }

    async fn reply(&self, to: &User, text: impl Into<String>) {
        deliver(self.channel.as_ref(), OutboundMessage::text(to.external_id, text)).await;
    }

    async fn send(&self, msg: OutboundMessage) {
        deliver(self.channel.as_ref(), msg).await;
    }

    async fn dispatch(&self, user: &User, content: MessageContent) -> Result<(), RoamerError> {
        match content {
            MessageContent::Text(text) => self.on_text(user, &text).await,
            MessageContent::Photo { file_id, .. } => self.on_photo(user, &file_id).await,
            MessageContent::Callback(data) => self.on_callback(user, &data).await,
        }
    }

    async fn on_text(&self, user: &User, text: &str) -> Result<(), RoamerError> {
        if let Some(command) = Command::parse(text) {
            self.awaiting.clear(user.external_id);
            return self.on_command(user, command).await;
        }

        match self.awaiting.take(user.external_id) {
            AwaitingInput::ReservationDetails(location) => {
                return self.book(user, location, text.trim()).await;
            }
            AwaitingInput::Photo(_) => {
                self.reply(user, "Expected a photo.").await;
                return Ok(());
            }
            AwaitingInput::None => {}
        }

        if let Some(pairing) = self.directory.pairing_of(user.external_id) {
            return self.relay(user, pairing, text).await;
        }

        self.search(user, text).await
    }

    async fn on_photo(&self, user: &User, file_id: &str) -> Result<(), RoamerError> {
        match self.awaiting.take(user.external_id) {
            AwaitingInput::Photo(location) => {
                self.storage.add_location_photo(location, file_id).await?;
                info!(location = location.0, by = user.id.0, "photo added");
                self.reply(user, "Photo saved.").await;
            }
            pending @ AwaitingInput::ReservationDetails(_) => {
                self.awaiting.set(user.external_id, pending);
                self.reply(user, "Please describe your reservation in text.")
                    .await;
            }
            AwaitingInput::None => {
                self.reply(user, "Photos are only accepted after /addphoto.")
                    .await;
            }
        }
        Ok(())
    }

    async fn on_command(&self, user: &User, command: Command) -> Result<(), RoamerError> {
        debug!(user = user.id.0, ?command, "command");
        match command {
            Command::Start => {
                self.send(
                    OutboundMessage::text(
                        user.external_id,
                        format!("Hello, {}! Choose an action:", user.first_name),
                    )
                    .with_keyboard(menu::main_menu(user.role)),
                )
                .await;
            }
            Command::Locations => {
                self.reply(user, "Enter a search word (or * for all):").await;
            }
            Command::NewTrip(name) => {
                let trip = self.planner.create_trip(user.id, name.as_deref()).await?;
                self.reply(
                    user,
                    format!("Route \"{}\" created. Add locations to it.", trip.name),
                )
                .await;
            }
            Command::ShowTrip => self.show_trip(user).await?,
            Command::Optimize => self.optimize_trip(user).await?,
            Command::Subscribe => {
                self.storage.subscribe_offers(user.id).await?;
                self.reply(user, "You are subscribed to offers.").await;
            }
            Command::Unsubscribe => {
                self.storage.unsubscribe_offers(user.id).await?;
                self.reply(user, "You are unsubscribed from offers.").await;
            }
            Command::MyReservations => self.list_reservations(user).await?,
            Command::Support => {
                self.reply(
                    user,
                    format!("Contact {} for support.", self.settings.support_handle),
                )
                .await;
            }
            Command::EndChat => self.end_chat(user).await,
            Command::AddPhoto(None) => {
                self.reply(user, "Usage: /addphoto <location id>").await;
            }
            Command::AddPhoto(Some(location)) => {
                require_role(user, Role::Support, "add photos")?;
                let location = self.location(location).await?;
                self.awaiting
                    .set(user.external_id, AwaitingInput::Photo(location.id));
                self.reply(user, format!("Send a photo for location #{}", location.id))
                    .await;
            }
            Command::Broadcast(text) => self.broadcast(user, &text).await?,
            Command::Chat(None) => {
                self.reply(user, "Usage: /chat <reservation id>").await;
            }
            Command::Chat(Some(reservation)) => self.start_chat(user, reservation).await?,
            Command::BroadcastHelp => {
                require_role(user, Role::Support, "broadcast")?;
                self.reply(user, "Use /broadcast <text> to send an offer to subscribers.")
                    .await;
            }
            Command::AddPhotoHelp => {
                require_role(user, Role::Support, "add photos")?;
                self.reply(user, "Use /addphoto <location id> to add a photo.")
                    .await;
            }
            Command::CheckLocations => self.check_locations(user).await?,
            Command::Unknown(name) => {
                self.reply(user, format!("Unknown command /{name}.")).await;
            }
        }
        Ok(())
    }

    async fn on_callback(&self, user: &User, data: &str) -> Result<(), RoamerError> {
        let action: CallbackAction = match data.parse() {
            Ok(action) => action,
            Err(e) => {
                warn!(user = user.id.0, error = %e, "ignoring callback");
                self.reply(user, "This button is no longer available.").await;
                return Ok(());
            }
        };
        debug!(user = user.id.0, %action, "callback");

        match action {
            CallbackAction::ShowLocation(id) => self.show_location(user, id).await,
            CallbackAction::Book(id) => {
                let location = self.location(id).await?;
                if location.provider_id.is_none() {
                    self.reply(user, format!("{} does not take reservations.", location.name))
                        .await;
                    return Ok(());
                }
                self.awaiting
                    .set(user.external_id, AwaitingInput::ReservationDetails(id));
                self.reply(
                    user,
                    format!(
                        "Describe your reservation for {} (dates, number of people):",
                        location.name
                    ),
                )
                .await;
                Ok(())
            }
            CallbackAction::AddToTrip(id) => {
                let location = self.location(id).await?;
                let text = match self.planner.add_stop(user.id, id).await? {
                    StopOutcome::Added { position, .. } => {
                        format!("Added {} to your route as stop {position}.", location.name)
                    }
                    StopOutcome::AlreadyPresent { .. } => {
                        format!("{} is already in your route.", location.name)
                    }
                };
                self.reply(user, text).await;
                Ok(())
            }
            CallbackAction::Chat(reservation) => self.start_chat(user, reservation).await,
            CallbackAction::Confirm(reservation) => {
                self.decide(user, reservation, Decision::Confirm).await
            }
            CallbackAction::Reject(reservation) => {
                self.decide(user, reservation, Decision::Reject).await
            }
        }
    }

    async fn location(&self, id: LocationId) -> Result<Location, RoamerError> {
        self.storage
            .get_location(id)
            .await?
            .ok_or_else(|| RoamerError::not_found("location", id))
    }

    async fn user(&self, id: UserId) -> Result<User, RoamerError> {
        self.storage
            .get_user(id)
            .await?
            .ok_or_else(|| RoamerError::not_found("user", id))
    }

    async fn search(&self, user: &User, text: &str) -> Result<(), RoamerError> {
        let query = LocationQuery {
            limit: Some(self.settings.max_results),
            ..LocationQuery::keyword(text)
        };
        let found = self.storage.search_locations(&query).await?;
        debug!(user = user.id.0, keyword = query.keyword.as_str(), hits = found.len(), "search");
        if found.is_empty() {
            self.reply(user, "Nothing found.").await;
            return Ok(());
        }
        self.send(
            OutboundMessage::text(user.external_id, format!("Found: {}", found.len()))
                .with_keyboard(menu::search_results(&found, self.settings.label_max_chars)),
        )
        .await;
        Ok(())
    }

    async fn show_location(&self, user: &User, id: LocationId) -> Result<(), RoamerError> {
        let location = self.location(id).await?;
        let photos = self.storage.list_location_photos(id).await?;
        let open = self.storage.latest_open_reservation(user.id, id).await?;

        let mut text = location.name.clone();
        if !location.description.is_empty() {
            let _ = write!(text, "\n{}", location.description);
        }
        let _ = write!(
            text,
            "\nCategory: {}\nRegion: {}\nRating: {:.1}\nPhotos: {}",
            location.category,
            location.region,
            location.rating,
            photos.len()
        );
        self.send(
            OutboundMessage::text(user.external_id, text)
                .with_keyboard(menu::location_actions(&location, open.map(|r| r.id))),
        )
        .await;
        Ok(())
    }

    /// Create a pending reservation and ask the owning provider to decide.
    async fn book(&self, user: &User, location: LocationId, details: &str) -> Result<(), RoamerError> {
        let reservation = self.ledger.create(user.id, location, details).await?;
        let location = self.location(location).await?;

        match location.provider_id {
            Some(provider) => {
                let provider = self.user(provider).await?;
                self.send(
                    OutboundMessage::text(
                        provider.external_id,
                        format!(
                            "New reservation from {} for {}: {}",
                            user.first_name, location.name, details
                        ),
                    )
                    .with_keyboard(menu::decision_buttons(reservation)),
                )
                .await;
            }
            None => {
                warn!(
                    reservation_id = reservation.0,
                    location = location.id.0,
                    "reservation on a location without provider"
                );
            }
        }
        self.reply(user, "Request sent to provider.").await;
        Ok(())
    }

    /// Confirm or reject on behalf of the owning provider.
    ///
    /// The requester is notified either way; a confirmation also pairs the
    /// requester and the provider for chat.
    async fn decide(
        &self,
        provider: &User,
        id: ReservationId,
        decision: Decision,
    ) -> Result<(), RoamerError> {
        let reservation = self.ledger.get(id).await?;
        let location = self.location(reservation.location_id).await?;
        if location.provider_id != Some(provider.id) {
            return Err(RoamerError::Unauthorized {
                action: format!("decide on reservation {id}"),
            });
        }

        self.ledger.decide(id, decision).await?;
        let requester = self.user(reservation.user_id).await?;

        match decision {
            Decision::Confirm => {
                self.directory
                    .open(requester.external_id, provider.external_id, id);
                self.reply(
                    &requester,
                    format!(
                        "Your reservation #{id} for {} is confirmed. Messages you send here now go to the provider; send /endchat to finish.",
                        location.name
                    ),
                )
                .await;
                self.reply(
                    provider,
                    format!(
                        "Reservation #{id} confirmed. You are now chatting with {}.",
                        requester.first_name
                    ),
                )
                .await;
            }
            Decision::Reject => {
                self.reply(
                    &requester,
                    format!("Your reservation #{id} for {} was rejected.", location.name),
                )
                .await;
                self.reply(provider, format!("Reservation #{id} rejected.")).await;
            }
        }
        Ok(())
    }

    /// Pair the caller with the other party of an existing reservation.
    ///
    /// The requester is paired with the location's provider and the provider
    /// with the requester; anybody else is refused.
    async fn start_chat(&self, user: &User, id: ReservationId) -> Result<(), RoamerError> {
        let reservation = self.ledger.get(id).await?;
        let partner = if reservation.user_id == user.id {
            let location = self.location(reservation.location_id).await?;
            let provider = location
                .provider_id
                .ok_or_else(|| RoamerError::not_found("provider of location", location.id))?;
            self.user(provider).await?
        } else {
            let location = self.location(reservation.location_id).await?;
            if location.provider_id != Some(user.id) {
                return Err(RoamerError::Unauthorized {
                    action: format!("chat on reservation {id}"),
                });
            }
            self.user(reservation.user_id).await?
        };

        self.directory.open(user.external_id, partner.external_id, id);
        self.reply(
            user,
            format!(
                "Chat for reservation #{id} with {} is open. Send /endchat to finish.",
                partner.first_name
            ),
        )
        .await;
        self.reply(
            &partner,
            format!("{} opened the chat for reservation #{id}.", user.first_name),
        )
        .await;
        Ok(())
    }

    async fn end_chat(&self, user: &User) {
        match self.directory.close(user.external_id) {
            Some(pairing) => {
                if pairing.partner != user.external_id {
                    self.send(OutboundMessage::text(
                        pairing.partner,
                        format!("{} ended the chat.", user.first_name),
                    ))
                    .await;
                }
                self.reply(user, "Chat closed.").await;
            }
            None => self.reply(user, "You have no active chat.").await,
        }
    }

    /// Forward chat text to the partner and archive it.
    async fn relay(&self, user: &User, pairing: Pairing, text: &str) -> Result<(), RoamerError> {
        let Some(partner) = self.storage.get_user_by_external_id(pairing.partner).await? else {
            self.directory.close(user.external_id);
            return Err(RoamerError::not_found("chat partner", pairing.partner));
        };

        self.send(OutboundMessage::text(
            pairing.partner,
            format!("{}: {}", user.first_name, text),
        ))
        .await;
        self.storage
            .insert_chat_message(&NewChatMessage {
                from_user_id: user.id,
                to_user_id: Some(partner.id),
                reservation_id: Some(pairing.reservation_id),
                content: text.to_string(),
                is_support: false,
            })
            .await?;
        debug!(
            from = user.id.0,
            to = partner.id.0,
            reservation_id = pairing.reservation_id.0,
            "chat relayed"
        );
        Ok(())
    }

    async fn show_trip(&self, user: &User) -> Result<(), RoamerError> {
        let Some(trip) = self.planner.active_trip(user.id).await? else {
            self.reply(user, "You have no route yet. Use /newtrip to start one.")
                .await;
            return Ok(());
        };
        let stops = self.planner.stops(trip.id).await?;
        let text = if stops.is_empty() {
            format!("Route \"{}\" is empty.", trip.name)
        } else {
            format!("{}:\n{}", trip.name, numbered(&stops))
        };
        self.reply(user, text).await;
        Ok(())
    }

    async fn optimize_trip(&self, user: &User) -> Result<(), RoamerError> {
        let Some(trip) = self.planner.active_trip(user.id).await? else {
            self.reply(user, "You have no route yet. Use /newtrip to start one.")
                .await;
            return Ok(());
        };
        let ordered = self.planner.optimize(trip.id).await?;
        if ordered.len() < 2 {
            self.reply(user, "Add at least two locations to optimize the route.")
                .await;
            return Ok(());
        }
        self.reply(user, format!("Optimized route:\n{}", numbered(&ordered)))
            .await;
        Ok(())
    }

    async fn list_reservations(&self, user: &User) -> Result<(), RoamerError> {
        require_role(user, Role::Provider, "list provider reservations")?;
        let reservations = self.storage.list_provider_reservations(user.id).await?;
        if reservations.is_empty() {
            self.reply(user, "No reservations yet.").await;
            return Ok(());
        }
        for reservation in reservations.iter().take(self.settings.max_results) {
            let location = self.location(reservation.location_id).await?;
            self.send(
                OutboundMessage::text(
                    user.external_id,
                    format!(
                        "#{} {}: {} ({})",
                        reservation.id, location.name, reservation.details, reservation.status
                    ),
                )
                .with_keyboard(menu::reservation_actions(reservation)),
            )
            .await;
        }
        Ok(())
    }

    async fn broadcast(&self, user: &User, text: &str) -> Result<(), RoamerError> {
        require_role(user, Role::Support, "broadcast")?;
        if text.is_empty() {
            self.reply(user, "Usage: /broadcast <text>").await;
            return Ok(());
        }
        let handles = self.storage.subscriber_handles().await?;
        for handle in &handles {
            self.send(OutboundMessage::text(*handle, text)).await;
        }
        info!(by = user.id.0, recipients = handles.len(), "offer broadcast");
        self.reply(
            user,
            format!("Broadcast sent to {} subscribers.", handles.len()),
        )
        .await;
        Ok(())
    }

    async fn check_locations(&self, user: &User) -> Result<(), RoamerError> {
        require_role(user, Role::Support, "check locations")?;
        let locations = self.storage.search_locations(&LocationQuery::default()).await?;
        if locations.is_empty() {
            self.reply(user, "No locations yet.").await;
            return Ok(());
        }
        let mut text = String::from("Locations:");
        for location in &locations {
            let photos = self.storage.list_location_photos(location.id).await?.len();
            let _ = write!(
                text,
                "\n#{} {} | photos: {photos}{}",
                location.id,
                location.name,
                if location.provider_id.is_some() { "" } else { " | no provider" }
            );
        }
        self.reply(user, text).await;
        Ok(())
    }
}

#[async_trait]
impl InboundHandler for Concierge {
    async fn handle(&self, msg: InboundMessage) -> Result<(), RoamerError> {
        let user = self.storage.resolve_or_create_user(&msg.sender).await?;
        match self.dispatch(&user, msg.content).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_recoverable() => {
                debug!(user = user.id.0, error = %e, "rejected request");
                self.reply(&user, user_facing(&e)).await;
                Ok(())
            }
            Err(e) => {
                self.reply(&user, user_facing(&e)).await;
                Err(e)
            }
        }
    }
}

fn require_role(user: &User, role: Role, action: &str) -> Result<(), RoamerError> {
    if user.role == role {
        Ok(())
    } else {
        Err(RoamerError::Unauthorized {
            action: action.to_string(),
        })
    }
}

fn numbered(locations: &[Location]) -> String {
    locations
        .iter()
        .enumerate()
        .map(|(i, l)| format!("{}. {}", i + 1, l.name))
        .collect::<Vec<_>>()
        .join("\n")
}

