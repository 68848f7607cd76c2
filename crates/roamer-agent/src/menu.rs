// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Menu labels and keyboards shown by the main bot.

use roamer_core::types::{InlineAction, Keyboard, Location, Reservation};
use roamer_core::{ReservationId, Role};

use crate::command::CallbackAction;

pub const FIND_LOCATIONS: &str = "📍 Find locations";
pub const NEW_TRIP: &str = "🗺 New route";
pub const MY_TRIP: &str = "🧭 My route";
pub const OPTIMIZE_TRIP: &str = "🔀 Optimize route";
pub const SUBSCRIBE: &str = "✅ Subscribe to offers";
pub const SUPPORT: &str = "🛎 Support";
pub const MY_RESERVATIONS: &str = "📦 My reservations";
pub const BROADCAST: &str = "📤 Broadcast";
pub const ADD_PHOTO: &str = "📷 Add photo";
pub const CHECK_LOCATIONS: &str = "🔍 Check locations";

fn rows(labels: &[&[&str]]) -> Keyboard {
    Keyboard::Menu(
        labels
            .iter()
            .map(|row| row.iter().map(|l| (*l).to_string()).collect())
            .collect(),
    )
}

/// Persistent menu for the given role.
pub fn main_menu(role: Role) -> Keyboard {
    match role {
        Role::Requester => rows(&[
            &[FIND_LOCATIONS, NEW_TRIP],
            &[MY_TRIP, OPTIMIZE_TRIP],
            &[SUBSCRIBE, SUPPORT],
        ]),
        Role::Provider => rows(&[&[FIND_LOCATIONS, MY_RESERVATIONS], &[SUPPORT]]),
        Role::Support => rows(&[&[BROADCAST, ADD_PHOTO], &[CHECK_LOCATIONS]]),
    }
}

/// Shorten `name` to at most `max_chars` characters followed by `...`.
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    match name.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &name[..cut]),
        None => name.to_string(),
    }
}

/// One button per search hit, each opening the location's details.
pub fn search_results(locations: &[Location], label_max_chars: usize) -> Keyboard {
    Keyboard::Inline(
        locations
            .iter()
            .map(|loc| {
                vec![InlineAction::new(
                    truncate_label(&loc.name, label_max_chars),
                    CallbackAction::ShowLocation(loc.id).to_string(),
                )]
            })
            .collect(),
    )
}

/// Actions offered under a location's details.
///
/// `reservation` is the viewer's open reservation on the location, if any;
/// it adds a button that reopens the chat with the provider.
pub fn location_actions(location: &Location, reservation: Option<ReservationId>) -> Keyboard {
    let mut row = Vec::with_capacity(3);
    if location.provider_id.is_some() {
        row.push(InlineAction::new(
            "📝 Book",
            CallbackAction::Book(location.id).to_string(),
        ));
    }
    row.push(InlineAction::new(
        "➕ Add to route",
        CallbackAction::AddToTrip(location.id).to_string(),
    ));
    if let (Some(_), Some(reservation)) = (location.provider_id, reservation) {
        row.push(InlineAction::new(
            "💬 Chat",
            CallbackAction::Chat(reservation).to_string(),
        ));
    }
    Keyboard::Inline(vec![row])
}

/// Confirm and reject buttons sent to the owning provider.
pub fn decision_buttons(reservation: ReservationId) -> Keyboard {
    Keyboard::Inline(vec![vec![
        InlineAction::new("✔ Confirm", CallbackAction::Confirm(reservation).to_string()),
        InlineAction::new("✖ Reject", CallbackAction::Reject(reservation).to_string()),
    ]])
}

/// Button that (re)opens the chat for a reservation.
pub fn chat_button(reservation: ReservationId) -> Keyboard {
    Keyboard::Inline(vec![vec![InlineAction::new(
        "💬 Chat",
        CallbackAction::Chat(reservation).to_string(),
    )]])
}

/// Provider overview: pending ones get decision buttons, others a chat button.
pub fn reservation_actions(reservation: &Reservation) -> Keyboard {
    if reservation.status.is_terminal() {
        chat_button(reservation.id)
    } else {
        decision_buttons(reservation.id)
    }
}
