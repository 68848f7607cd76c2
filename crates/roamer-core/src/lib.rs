// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Roamer.
//!
//! This crate provides the error type, the domain records (identities,
//! locations, reservations, trips, chat messages), and the adapter traits
//! that the storage and channel crates implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RoamerError;
pub use types::{
    AdapterType, ExternalId, HealthStatus, LocationId, MessageId, ReservationId,
    ReservationStatus, Role, TripId, UserId,
};

pub use traits::{ChannelAdapter, PluginAdapter, StorageAdapter};
