// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer broadcast subscriptions.

use roamer_core::{ExternalId, RoamerError, UserId};
use rusqlite::params;

use crate::database::Database;

/// Subscribe `user` to offers. Idempotent.
pub async fn subscribe_offers(db: &Database, user: UserId) -> Result<(), RoamerError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO offer_subscriptions (user_id) VALUES (?1)",
                params![user.0],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove a subscription. Unsubscribing twice is not an error.
pub async fn unsubscribe_offers(db: &Database, user: UserId) -> Result<(), RoamerError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM offer_subscriptions WHERE user_id = ?1",
                params![user.0],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messaging handles of every subscriber.
pub async fn subscriber_handles(db: &Database) -> Result<Vec<ExternalId>, RoamerError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.external_id FROM offer_subscriptions s
                 JOIN users u ON u.id = s.user_id
                 ORDER BY s.user_id",
            )?;
            let rows = stmt.query_map([], |row| Ok(ExternalId(row.get(0)?)))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
