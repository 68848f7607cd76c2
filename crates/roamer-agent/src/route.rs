// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trip management and nearest-neighbor route ordering.

use std::sync::Arc;

use roamer_core::types::{Location, Trip};
use roamer_core::{LocationId, RoamerError, StorageAdapter, TripId, UserId};
use tracing::{debug, info};

/// Anything with planar coordinates in raw latitude/longitude units.
pub trait Positioned {
    fn position(&self) -> (f64, f64);
}

impl Positioned for Location {
    fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl Positioned for (f64, f64) {
    fn position(&self) -> (f64, f64) {
        *self
    }
}

fn squared_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Greedy nearest-neighbor ordering.
///
/// The first item stays first. Each following item is the unplaced one
/// closest to the previously placed item; ties go to the lowest input
/// index. A NaN distance never wins, so an item with NaN coordinates is
/// placed only once nothing comparable is left.
pub fn nearest_neighbor_order<T: Positioned + Clone>(items: &[T]) -> Vec<T> {
    if items.len() < 2 {
        return items.to_vec();
    }

    let mut placed = vec![false; items.len()];
    let mut order = Vec::with_capacity(items.len());
    placed[0] = true;
    order.push(items[0].clone());
    let mut last = items[0].position();

    for _ in 1..items.len() {
        let mut best: Option<(usize, f64)> = None;
        for (idx, item) in items.iter().enumerate() {
            if placed[idx] {
                continue;
            }
            let dist = squared_distance(last, item.position());
            match best {
                None => best = Some((idx, dist)),
                Some((_, best_dist)) if dist < best_dist || best_dist.is_nan() && !dist.is_nan() => {
                    best = Some((idx, dist));
                }
                Some(_) => {}
            }
        }
        // `best` is always set: one unplaced item remains per iteration.
        let Some((idx, _)) = best else { break };
        placed[idx] = true;
        last = items[idx].position();
        order.push(items[idx].clone());
    }
    order
}

/// Result of adding a location to a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Added { trip: TripId, position: i64 },
    AlreadyPresent { trip: TripId },
}

/// Creates trips, appends stops, and writes optimized orders back to storage.
pub struct TripPlanner {
    storage: Arc<dyn StorageAdapter>,
    default_trip_name: String,
}

impl TripPlanner {
    pub fn new(storage: Arc<dyn StorageAdapter>, default_trip_name: impl Into<String>) -> Self {
        Self {
            storage,
            default_trip_name: default_trip_name.into(),
        }
    }

    /// Start a new draft trip, which becomes the owner's active trip.
    pub async fn create_trip(&self, owner: UserId, name: Option<&str>) -> Result<Trip, RoamerError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.default_trip_name);
        let id = self.storage.create_trip(owner, name).await?;
        info!(trip_id = id.0, owner = owner.0, "trip created");
        self.storage
            .get_trip(id)
            .await?
            .ok_or_else(|| RoamerError::not_found("trip", id))
    }

    /// The owner's most recent trip, if any.
    pub async fn active_trip(&self, owner: UserId) -> Result<Option<Trip>, RoamerError> {
        self.storage.latest_trip(owner).await
    }

    /// Append `location` to the owner's active trip, creating a default trip
    /// when the owner has none yet.
    pub async fn add_stop(
        &self,
        owner: UserId,
        location: LocationId,
    ) -> Result<StopOutcome, RoamerError> {
        if self.storage.get_location(location).await?.is_none() {
            return Err(RoamerError::not_found("location", location));
        }
        let trip = match self.active_trip(owner).await? {
            Some(trip) => trip,
            None => self.create_trip(owner, None).await?,
        };
        Ok(
            match self.storage.add_trip_location(trip.id, location).await? {
                Some(position) => {
                    debug!(trip_id = trip.id.0, location = location.0, position, "stop added");
                    StopOutcome::Added {
                        trip: trip.id,
                        position,
                    }
                }
                None => StopOutcome::AlreadyPresent { trip: trip.id },
            },
        )
    }

    pub async fn stops(&self, trip: TripId) -> Result<Vec<Location>, RoamerError> {
        self.storage.trip_locations(trip).await
    }

    /// Reorder the trip by nearest neighbor and persist the new order.
    ///
    /// Trips with fewer than two stops are returned unchanged without a write.
    pub async fn optimize(&self, trip: TripId) -> Result<Vec<Location>, RoamerError> {
        let current = self.stops(trip).await?;
        if current.len() < 2 {
            return Ok(current);
        }
        let ordered = nearest_neighbor_order(&current);
        let ids: Vec<LocationId> = ordered.iter().map(|l| l.id).collect();
        self.storage.reorder_trip(trip, &ids).await?;
        info!(trip_id = trip.0, stops = ids.len(), "trip optimized");
        Ok(ordered)
    }
}
