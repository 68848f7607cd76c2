// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! What the bot expects as the next message from each identity.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use roamer_core::{ExternalId, LocationId};

/// The pending follow-up for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AwaitingInput {
    #[default]
    None,
    /// Next text message is the free-text details of a reservation.
    ReservationDetails(LocationId),
    /// Next photo is attached to the location.
    Photo(LocationId),
}

/// Single table of pending follow-ups, keyed by messaging handle.
#[derive(Debug, Default)]
pub struct AwaitingInputs {
    table: Mutex<HashMap<ExternalId, AwaitingInput>>,
}

impl AwaitingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<ExternalId, AwaitingInput>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace whatever was pending for `id`. Setting `None` clears it.
    pub fn set(&self, id: ExternalId, input: AwaitingInput) {
        let mut table = self.table();
        match input {
            AwaitingInput::None => table.remove(&id),
            other => table.insert(id, other),
        };
    }

    /// Remove and return the pending follow-up.
    pub fn take(&self, id: ExternalId) -> AwaitingInput {
        self.table().remove(&id).unwrap_or_default()
    }

    pub fn peek(&self, id: ExternalId) -> AwaitingInput {
        self.table().get(&id).copied().unwrap_or_default()
    }

    pub fn clear(&self, id: ExternalId) {
        self.table().remove(&id);
    }
}
