// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Roamer.

use thiserror::Error;

use crate::types::{ReservationId, ReservationStatus};

/// The primary error type used across Roamer adapter traits and services.
#[derive(Debug, Error)]
pub enum RoamerError {
    /// Configuration errors (invalid TOML, missing tokens, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// An entity identifier did not resolve.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A lifecycle transition was attempted from a state that does not allow it.
    #[error("reservation {reservation_id} cannot move from {from} to {to}")]
    InvalidTransition {
        reservation_id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// The acting identity is not allowed to perform the action.
    #[error("not permitted: {action}")]
    Unauthorized { action: String },

    /// Storage backend errors (query failure, rolled-back batch, closed connection).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (delivery failure, malformed update).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoamerError {
    /// Shorthand for a [`RoamerError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// A channel whose inbound stream has ended for good.
    pub fn channel_closed(channel: &str) -> Self {
        Self::Channel {
            message: format!("{channel} closed"),
            source: None,
        }
    }

    /// Whether this error reports a channel that will never deliver again.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, Self::Channel { message, source: None } if message.ends_with(" closed"))
    }

    /// Whether the orchestration layer should answer this error with a
    /// user-facing message instead of treating it as a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::InvalidTransition { .. } | Self::Unauthorized { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = RoamerError::not_found("location", 42);
        assert_eq!(err.to_string(), "location 42 not found");
        assert!(err.is_recoverable());
    }

    #[test]
    fn invalid_transition_mentions_both_states() {
        let err = RoamerError::InvalidTransition {
            reservation_id: ReservationId(7),
            from: ReservationStatus::Rejected,
            to: ReservationStatus::Confirmed,
        };
        assert_eq!(
            err.to_string(),
            "reservation 7 cannot move from rejected to confirmed"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn storage_errors_are_not_recoverable() {
        let err = RoamerError::Storage {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert!(!err.is_recoverable());
        assert!(!RoamerError::Internal("x".into()).is_recoverable());
    }

    #[test]
    fn closed_channel_is_recognized() {
        let err = RoamerError::channel_closed("telegram");
        assert_eq!(err.to_string(), "channel error: telegram closed");
        assert!(err.is_channel_closed());

        let other = RoamerError::Channel {
            message: "send failed".into(),
            source: None,
        };
        assert!(!other.is_channel_closed());
    }
}
