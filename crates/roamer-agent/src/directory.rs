// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory pairing table for reservation-scoped chats.
//!
//! Each paired participant maps to its partner and to the reservation that
//! justified the pairing. Both halves of a pairing are always written and
//! removed under the same lock acquisition, so no caller can observe `A -> B`
//! without `B -> A`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use roamer_core::{ExternalId, ReservationId};
use tracing::{debug, warn};

/// One participant's half of a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub partner: ExternalId,
    pub reservation_id: ReservationId,
}

/// A pairing displaced by a later [`SessionDirectory::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    /// Participant of the new pairing whose old pairing was dropped.
    pub participant: ExternalId,
    /// The partner that participant was paired with before.
    pub former_partner: ExternalId,
    /// Reservation of the dropped pairing.
    pub reservation_id: ReservationId,
}

/// Concurrent pairing table. Construct once and share behind an `Arc`.
#[derive(Debug, Default)]
pub struct SessionDirectory {
    table: Mutex<HashMap<ExternalId, Pairing>>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation completes both halves before releasing the guard, so a
    // poisoned table is still consistent.
    fn table(&self) -> MutexGuard<'_, HashMap<ExternalId, Pairing>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pair `a` with `b` for `reservation_id`.
    ///
    /// Any pairing either participant already had is removed first, including
    /// the other half held by its partner. Returns the pairings that were
    /// displaced in favor of a different partner; re-opening an existing
    /// pairing between the same two participants reports nothing.
    pub fn open(&self, a: ExternalId, b: ExternalId, reservation_id: ReservationId) -> Vec<Eviction> {
        let mut evictions = Vec::new();
        {
            let mut table = self.table();
            for participant in [a, b] {
                if let Some(prior) = remove_pair(&mut table, participant)
                    && prior.partner != a
                    && prior.partner != b
                {
                    evictions.push(Eviction {
                        participant,
                        former_partner: prior.partner,
                        reservation_id: prior.reservation_id,
                    });
                }
            }
            table.insert(
                a,
                Pairing {
                    partner: b,
                    reservation_id,
                },
            );
            table.insert(
                b,
                Pairing {
                    partner: a,
                    reservation_id,
                },
            );
        }

        for eviction in &evictions {
            warn!(
                participant = eviction.participant.0,
                former_partner = eviction.former_partner.0,
                former_reservation = eviction.reservation_id.0,
                reservation_id = reservation_id.0,
                "pairing replaced"
            );
        }
        debug!(a = a.0, b = b.0, reservation_id = reservation_id.0, "pairing opened");
        evictions
    }

    /// Remove `id` and its partner's half. Returns what `id` was paired with.
    pub fn close(&self, id: ExternalId) -> Option<Pairing> {
        let removed = remove_pair(&mut self.table(), id);
        if let Some(pairing) = removed {
            debug!(
                participant = id.0,
                partner = pairing.partner.0,
                reservation_id = pairing.reservation_id.0,
                "pairing closed"
            );
        }
        removed
    }

    pub fn partner_of(&self, id: ExternalId) -> Option<ExternalId> {
        self.table().get(&id).map(|p| p.partner)
    }

    pub fn reservation_of(&self, id: ExternalId) -> Option<ReservationId> {
        self.table().get(&id).map(|p| p.reservation_id)
    }

    /// Partner and reservation read under one lock.
    pub fn pairing_of(&self, id: ExternalId) -> Option<Pairing> {
        self.table().get(&id).copied()
    }

    /// Number of paired participants (two per pairing, one for a self-pairing).
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

fn remove_pair(table: &mut HashMap<ExternalId, Pairing>, id: ExternalId) -> Option<Pairing> {
    let pairing = table.remove(&id)?;
    if pairing.partner != id
        && table
            .get(&pairing.partner)
            .is_some_and(|other| other.partner == id)
    {
        table.remove(&pairing.partner);
    }
    Some(pairing)
}
