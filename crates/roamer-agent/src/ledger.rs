// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reservation lifecycle on top of the store.
//!
//! A reservation is created `pending` and moves exactly once, to either
//! `confirmed` or `rejected`. The store's status write is itself guarded, so
//! two racing decisions can never both succeed; the loser gets
//! [`RoamerError::InvalidTransition`] and sends no notifications.

use std::sync::Arc;

use roamer_core::types::Reservation;
use roamer_core::{LocationId, ReservationId, ReservationStatus, RoamerError, StorageAdapter, UserId};
use tracing::{debug, info};

/// A provider's decision on a pending reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Reject,
}

impl Decision {
    pub fn target(self) -> ReservationStatus {
        match self {
            Self::Confirm => ReservationStatus::Confirmed,
            Self::Reject => ReservationStatus::Rejected,
        }
    }
}

pub struct ReservationLedger {
    storage: Arc<dyn StorageAdapter>,
}

impl ReservationLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Record a new pending reservation.
    ///
    /// Fails with `NotFound` when the location does not exist.
    pub async fn create(
        &self,
        requester: UserId,
        location: LocationId,
        details: &str,
    ) -> Result<ReservationId, RoamerError> {
        if self.storage.get_location(location).await?.is_none() {
            return Err(RoamerError::not_found("location", location));
        }
        let id = self
            .storage
            .create_reservation(requester, location, details)
            .await?;
        info!(
            reservation_id = id.0,
            requester = requester.0,
            location = location.0,
            "reservation created"
        );
        Ok(id)
    }

    pub async fn get(&self, id: ReservationId) -> Result<Reservation, RoamerError> {
        self.storage
            .get_reservation(id)
            .await?
            .ok_or_else(|| RoamerError::not_found("reservation", id))
    }

    pub async fn confirm(&self, id: ReservationId) -> Result<Reservation, RoamerError> {
        self.decide(id, Decision::Confirm).await
    }

    pub async fn reject(&self, id: ReservationId) -> Result<Reservation, RoamerError> {
        self.decide(id, Decision::Reject).await
    }

    /// Apply `decision` and return the updated record.
    pub async fn decide(
        &self,
        id: ReservationId,
        decision: Decision,
    ) -> Result<Reservation, RoamerError> {
        self.transition(id, decision.target()).await
    }

    async fn transition(
        &self,
        id: ReservationId,
        to: ReservationStatus,
    ) -> Result<Reservation, RoamerError> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(RoamerError::InvalidTransition {
                reservation_id: id,
                from: current.status,
                to,
            });
        }

        if !self.storage.transition_reservation(id, to).await? {
            // Another decision landed between the read and the write.
            let latest = self.get(id).await?;
            debug!(reservation_id = id.0, status = %latest.status, "lost transition race");
            return Err(RoamerError::InvalidTransition {
                reservation_id: id,
                from: latest.status,
                to,
            });
        }

        info!(reservation_id = id.0, status = %to, "reservation decided");
        Ok(Reservation {
            status: to,
            ..current
        })
    }
}

#[cfg(test)]
mod tests {
    use roamer_config::model::StorageConfig;
    use roamer_core::types::{ContactProfile, NewLocation};
    use roamer_core::{ExternalId, Role};
    use roamer_storage::SqliteStorage;
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        ledger: ReservationLedger,
        requester: UserId,
        location: LocationId,
        _dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("ledger.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();

        let provider = storage
            .resolve_or_create_user(&ContactProfile {
                external_id: ExternalId(200),
                first_name: "Pat".into(),
                ..ContactProfile::default()
            })
            .await
            .unwrap();
        storage
            .set_user_role(provider.id, Role::Provider)
            .await
            .unwrap();
        let requester = storage
            .resolve_or_create_user(&ContactProfile {
                external_id: ExternalId(100),
                first_name: "Rita".into(),
                ..ContactProfile::default()
            })
            .await
            .unwrap();
        let location = storage
            .insert_location(&NewLocation {
                name: "Lighthouse".into(),
                provider_id: Some(provider.id),
                ..NewLocation::default()
            })
            .await
            .unwrap();

        Fixture {
            ledger: ReservationLedger::new(Arc::new(storage)),
            requester: requester.id,
            location,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let f = fixture().await;
        let id = f
            .ledger
            .create(f.requester, f.location, "two people, friday")
            .await
            .unwrap();
        let stored = f.ledger.get(id).await.unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert_eq!(stored.details, "two people, friday");
        assert_eq!(stored.location_id, f.location);
    }

    #[tokio::test]
    async fn create_on_unknown_location_is_not_found() {
        let f = fixture().await;
        let err = f
            .ledger
            .create(f.requester, LocationId(9999), "")
            .await
            .unwrap_err();
        assert!(matches!(err, RoamerError::NotFound { entity: "location", .. }));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let f = fixture().await;
        let err = f.ledger.get(ReservationId(42)).await.unwrap_err();
        assert!(matches!(err, RoamerError::NotFound { entity: "reservation", .. }));
    }

    #[tokio::test]
    async fn confirm_then_reject_is_invalid() {
        let f = fixture().await;
        let id = f.ledger.create(f.requester, f.location, "").await.unwrap();

        let confirmed = f.ledger.confirm(id).await.unwrap();
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);

        let err = f.ledger.reject(id).await.unwrap_err();
        match err {
            RoamerError::InvalidTransition { from, to, .. } => {
                assert_eq!(from, ReservationStatus::Confirmed);
                assert_eq!(to, ReservationStatus::Rejected);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
        assert_eq!(
            f.ledger.get(id).await.unwrap().status,
            ReservationStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn repeated_reject_is_invalid() {
        let f = fixture().await;
        let id = f.ledger.create(f.requester, f.location, "").await.unwrap();
        f.ledger.decide(id, Decision::Reject).await.unwrap();
        assert!(matches!(
            f.ledger.decide(id, Decision::Reject).await,
            Err(RoamerError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn racing_decisions_have_one_winner() {
        let f = fixture().await;
        let id = f.ledger.create(f.requester, f.location, "").await.unwrap();
        let ledger = Arc::new(f.ledger);

        let confirm = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.confirm(id).await }
        });
        let reject = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.reject(id).await }
        });
        let results = [confirm.await.unwrap(), reject.await.unwrap()];

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(ledger.get(id).await.unwrap().status, winners[0].status);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, RoamerError::InvalidTransition { .. }))
        );
    }
}
