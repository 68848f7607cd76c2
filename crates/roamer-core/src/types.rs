// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the storage, channel, and orchestration crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(
    /// Internal identity assigned by the store. Never reused.
    UserId
);
numeric_id!(
    /// Messaging-platform handle (Telegram user id). Unique per identity.
    ExternalId
);
numeric_id!(
    /// Location identifier.
    LocationId
);
numeric_id!(
    /// Reservation identifier.
    ReservationId
);
numeric_id!(
    /// Trip identifier.
    TripId
);

/// Identifier of a message delivered through a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// The closed set of identity roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A tourist looking for places to visit and book. Default for new identities.
    #[strum(to_string = "requester", serialize = "user")]
    Requester,
    /// Owns one or more locations and decides on their reservations.
    #[strum(to_string = "provider")]
    Provider,
    /// Operator of the support desk.
    #[strum(to_string = "support")]
    Support,
}

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// What the messaging platform tells us about a sender on contact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactProfile {
    pub external_id: ExternalId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// A point of interest that can be visited, booked, and added to trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Owning provider, if the location is offered by one.
    pub provider_id: Option<UserId>,
}

/// Fields of a location before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    pub description: String,
    pub category: String,
    pub region: String,
    pub rating: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub provider_id: Option<UserId>,
}

/// An opaque photo reference attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPhoto {
    pub id: i64,
    pub location_id: LocationId,
    pub file_id: String,
}

/// Search filters. Empty strings and `"any"` disable a filter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationQuery {
    pub keyword: String,
    pub category: String,
    pub region: String,
    pub min_rating: f64,
    pub limit: Option<usize>,
}

impl LocationQuery {
    /// Keyword-only search; `*` means every location.
    pub fn keyword(keyword: &str) -> Self {
        let keyword = keyword.trim();
        Self {
            keyword: if keyword == "*" {
                String::new()
            } else {
                keyword.to_string()
            },
            ..Self::default()
        }
    }
}

/// Reservation lifecycle states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl ReservationStatus {
    /// Confirmed and rejected reservations never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The only legal moves are pending -> confirmed and pending -> rejected.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Pending && next.is_terminal()
    }
}

/// A request to use a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub user_id: UserId,
    pub location_id: LocationId,
    /// Free text (dates, party size). Not validated.
    pub details: String,
    pub status: ReservationStatus,
    pub created_at: String,
}

/// A named, ordered collection of locations owned by one requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub user_id: UserId,
    pub name: String,
    pub status: String,
}

/// Link between a trip and one of its locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLocation {
    pub trip_id: TripId,
    pub location_id: LocationId,
    /// 1-based position in the route.
    pub order_index: i64,
}

/// An archived chat message. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub from_user_id: UserId,
    /// `None` for a support request not addressed to a particular operator.
    pub to_user_id: Option<UserId>,
    /// `None` for support chat.
    pub reservation_id: Option<ReservationId>,
    pub content: String,
    pub is_support: bool,
    pub created_at: String,
}

/// A chat message before it is archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub from_user_id: UserId,
    pub to_user_id: Option<UserId>,
    pub reservation_id: Option<ReservationId>,
    pub content: String,
    pub is_support: bool,
}

/// Content of an inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text, including `/commands` and menu button labels.
    Text(String),
    /// A photo, identified by the platform's file reference.
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    /// Payload of a pressed inline button.
    Callback(String),
}

/// A channel-agnostic inbound update.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Channel the update arrived on (e.g. "telegram", "telegram-support").
    pub channel: String,
    pub sender: ContactProfile,
    pub content: MessageContent,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// A pressable inline action attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAction {
    pub label: String,
    /// Opaque payload echoed back as [`MessageContent::Callback`].
    pub data: String,
}

impl InlineAction {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Rows of inline actions bound to this message.
    Inline(Vec<Vec<InlineAction>>),
    /// Rows of persistent menu buttons; pressing one sends its label as text.
    Menu(Vec<Vec<String>>),
}

/// A message to be delivered to one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: ExternalId,
    pub content: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    /// Plain text with no keyboard.
    pub fn text(recipient: ExternalId, content: impl Into<String>) -> Self {
        Self {
            recipient,
            content: content.into(),
            keyboard: None,
        }
    }

    /// Attach a keyboard.
    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// Inline actions, if any, flattened in row order.
    pub fn actions(&self) -> Vec<&InlineAction> {
        match &self.keyboard {
            Some(Keyboard::Inline(rows)) => rows.iter().flatten().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parses_legacy_user_alias() {
        assert_eq!(Role::from_str("user").unwrap(), Role::Requester);
        assert_eq!(Role::from_str("requester").unwrap(), Role::Requester);
        assert_eq!(Role::Requester.to_string(), "requester");
        assert_eq!(Role::from_str("support").unwrap(), Role::Support);
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn reservation_status_transitions() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Confirmed, Rejected] {
            assert!(terminal.is_terminal());
            for next in [Pending, Confirmed, Rejected] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn reservation_status_round_trips_through_strings() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Rejected,
        ] {
            let parsed = ReservationStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(ReservationStatus::Confirmed.to_string(), "confirmed");
    }

    #[test]
    fn keyword_query_treats_star_as_all() {
        assert_eq!(LocationQuery::keyword(" * ").keyword, "");
        assert_eq!(LocationQuery::keyword(" lake ").keyword, "lake");
    }

    #[test]
    fn ids_parse_and_display() {
        let id: ReservationId = " 15 ".parse().unwrap();
        assert_eq!(id, ReservationId(15));
        assert_eq!(id.to_string(), "15");
        assert!("abc".parse::<TripId>().is_err());
    }

    #[test]
    fn outbound_actions_flatten_rows() {
        let msg = OutboundMessage::text(ExternalId(1), "hi").with_keyboard(Keyboard::Inline(
            vec![
                vec![InlineAction::new("a", "A"), InlineAction::new("b", "B")],
                vec![InlineAction::new("c", "C")],
            ],
        ));
        let data: Vec<&str> = msg.actions().iter().map(|a| a.data.as_str()).collect();
        assert_eq!(data, ["A", "B", "C"]);

        let menu = OutboundMessage::text(ExternalId(1), "menu")
            .with_keyboard(Keyboard::Menu(vec![vec!["x".into()]]));
        assert!(menu.actions().is_empty());
    }
}
