// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of slash commands, menu labels and inline callback payloads.

use std::fmt;
use std::str::FromStr;

use roamer_core::{LocationId, ReservationId};

use crate::menu;

/// A recognized command from the main bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Locations,
    /// `/newtrip [name]`.
    NewTrip(Option<String>),
    ShowTrip,
    Optimize,
    Subscribe,
    Unsubscribe,
    MyReservations,
    Support,
    EndChat,
    /// `/addphoto <location id>`; `None` when the argument is missing or malformed.
    AddPhoto(Option<LocationId>),
    /// `/broadcast <text>`.
    Broadcast(String),
    /// `/chat <reservation id>`.
    Chat(Option<ReservationId>),
    BroadcastHelp,
    AddPhotoHelp,
    CheckLocations,
    /// A slash command we do not know.
    Unknown(String),
}

impl Command {
    /// Parse `text` as a slash command or a menu label.
    ///
    /// Returns `None` for free text, which is then treated as chat or a
    /// search keyword.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(body) = text.strip_prefix('/') {
            return Some(Self::parse_slash(body));
        }
        Some(match text {
            menu::FIND_LOCATIONS => Self::Locations,
            menu::NEW_TRIP => Self::NewTrip(None),
            menu::MY_TRIP => Self::ShowTrip,
            menu::OPTIMIZE_TRIP => Self::Optimize,
            menu::SUBSCRIBE => Self::Subscribe,
            menu::SUPPORT => Self::Support,
            menu::MY_RESERVATIONS => Self::MyReservations,
            menu::BROADCAST => Self::BroadcastHelp,
            menu::ADD_PHOTO => Self::AddPhotoHelp,
            menu::CHECK_LOCATIONS => Self::CheckLocations,
            _ => return None,
        })
    }

    fn parse_slash(body: &str) -> Self {
        let (head, args) = match body.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (body, ""),
        };
        // `/cmd@SomeBot` in group chats.
        let name = head.split_once('@').map_or(head, |(name, _)| name);

        match name {
            "start" => Self::Start,
            "locations" => Self::Locations,
            "newtrip" => Self::NewTrip((!args.is_empty()).then(|| args.to_string())),
            "trip" => Self::ShowTrip,
            "optimize" => Self::Optimize,
            "subscribe_offers" => Self::Subscribe,
            "unsubscribe_offers" => Self::Unsubscribe,
            "reservations" => Self::MyReservations,
            "support" => Self::Support,
            "endchat" => Self::EndChat,
            "addphoto" => Self::AddPhoto(args.parse().ok()),
            "broadcast" => Self::Broadcast(args.to_string()),
            "chat" => Self::Chat(args.parse().ok()),
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Payload of an inline button, e.g. `CONFIRM_12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ShowLocation(LocationId),
    Book(LocationId),
    AddToTrip(LocationId),
    Chat(ReservationId),
    Confirm(ReservationId),
    Reject(ReservationId),
}

/// A callback payload that does not match any known action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized callback payload `{0}`")]
pub struct UnknownCallback(pub String);

impl FromStr for CallbackAction {
    type Err = UnknownCallback;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(s.to_string());
        let (prefix, id) = s.split_once('_').ok_or_else(unknown)?;
        let id: i64 = id.parse().map_err(|_| unknown())?;
        Ok(match prefix {
            "LOC" => Self::ShowLocation(LocationId(id)),
            "BOOK" => Self::Book(LocationId(id)),
            "TRIP" => Self::AddToTrip(LocationId(id)),
            "CHAT" => Self::Chat(ReservationId(id)),
            "CONFIRM" => Self::Confirm(ReservationId(id)),
            "REJECT" => Self::Reject(ReservationId(id)),
            _ => return Err(unknown()),
        })
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowLocation(id) => write!(f, "LOC_{id}"),
            Self::Book(id) => write!(f, "BOOK_{id}"),
            Self::AddToTrip(id) => write!(f, "TRIP_{id}"),
            Self::Chat(id) => write!(f, "CHAT_{id}"),
            Self::Confirm(id) => write!(f, "CONFIRM_{id}"),
            Self::Reject(id) => write!(f, "REJECT_{id}"),
        }
    }
}
