// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orchestration for the Roamer bots.
//!
//! - [`ReservationLedger`] enforces the reservation lifecycle
//! - [`SessionDirectory`] pairs a requester and a provider for one reservation
//! - [`TripPlanner`] keeps trips and orders them by nearest neighbor
//! - [`Concierge`] drives the main bot, [`SupportDesk`] the support bot
//!
//! Both bots are driven by [`run`], which pulls updates from a channel and
//! hands them to an [`InboundHandler`] until the channel closes or shutdown
//! is requested.

pub mod awaiting;
pub mod command;
pub mod concierge;
pub mod directory;
pub mod ledger;
pub mod menu;
pub mod route;
pub mod shutdown;
pub mod support;

use std::sync::Arc;

use async_trait::async_trait;
use roamer_core::types::{InboundMessage, OutboundMessage};
use roamer_core::{ChannelAdapter, RoamerError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use awaiting::{AwaitingInput, AwaitingInputs};
pub use concierge::{Concierge, ConciergeSettings};
pub use directory::{Eviction, Pairing, SessionDirectory};
pub use ledger::{Decision, ReservationLedger};
pub use route::{TripPlanner, nearest_neighbor_order};
pub use support::SupportDesk;

/// Something that reacts to inbound updates from one channel.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    /// Handle one update. Errors returned here are logged by [`run`] and
    /// do not stop the loop.
    async fn handle(&self, msg: InboundMessage) -> Result<(), RoamerError>;
}

/// Pump updates from `channel` into `handler` until the channel closes or
/// `cancel` fires. Updates are handled one at a time, in arrival order.
pub async fn run(
    channel: Arc<dyn ChannelAdapter>,
    handler: Arc<dyn InboundHandler>,
    cancel: CancellationToken,
) -> Result<(), RoamerError> {
    let name = channel.name().to_string();
    info!(channel = name.as_str(), "bot loop running");

    loop {
        tokio::select! {
            msg = channel.receive() => {
                match msg {
                    Ok(inbound) => {
                        if let Err(e) = handler.handle(inbound).await {
                            error!(channel = name.as_str(), error = %e, "failed to handle inbound update");
                        }
                    }
                    Err(e) if e.is_channel_closed() => {
                        info!(channel = name.as_str(), "channel closed, stopping bot loop");
                        break;
                    }
                    Err(e) => {
                        error!(channel = name.as_str(), error = %e, "channel receive error");
                    }
                }
            }
            _ = cancel.cancelled() => {
                info!(channel = name.as_str(), "shutdown signal received, stopping bot loop");
                break;
            }
        }
    }

    info!(channel = name.as_str(), "bot loop stopped");
    Ok(())
}

/// Send `msg`, logging instead of failing. Delivery problems never undo
/// reservation or pairing state.
pub(crate) async fn deliver(channel: &dyn ChannelAdapter, msg: OutboundMessage) {
    let recipient = msg.recipient;
    if let Err(e) = channel.send(msg).await {
        warn!(recipient = recipient.0, error = %e, "failed to deliver message");
    }
}

/// Reply text for an error raised while handling a user's update.
pub(crate) fn user_facing(err: &RoamerError) -> String {
    match err {
        RoamerError::NotFound { entity, id } => format!("Sorry, {entity} #{id} was not found."),
        RoamerError::InvalidTransition {
            reservation_id,
            from,
            ..
        } => format!("Reservation #{reservation_id} is already {from}."),
        RoamerError::Unauthorized { .. } => "This action is not available to you.".to_string(),
        _ => "Something went wrong. Please try again later.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use roamer_core::{ReservationId, ReservationStatus};

    use super::*;

    #[test]
    fn user_facing_messages() {
        assert_eq!(
            user_facing(&RoamerError::not_found("location", 3)),
            "Sorry, location #3 was not found."
        );
        assert_eq!(
            user_facing(&RoamerError::InvalidTransition {
                reservation_id: ReservationId(8),
                from: ReservationStatus::Rejected,
                to: ReservationStatus::Confirmed,
            }),
            "Reservation #8 is already rejected."
        );
        assert_eq!(
            user_facing(&RoamerError::Internal("boom".into())),
            "Something went wrong. Please try again later."
        );
    }
}
