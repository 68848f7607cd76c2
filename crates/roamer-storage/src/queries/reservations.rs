// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reservation operations.
//!
//! Status writes are guarded on `status = 'pending'`, so a row that reached a
//! terminal state is never overwritten even when two decisions race.

use roamer_core::types::Reservation;
use roamer_core::{LocationId, ReservationId, ReservationStatus, RoamerError, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_text;

const RESERVATION_COLUMNS: &str = "r.id, r.user_id, r.location_id, r.details, r.status, r.created_at";

fn row_to_reservation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reservation> {
    let status: String = row.get(4)?;
    Ok(Reservation {
        id: ReservationId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        location_id: LocationId(row.get(2)?),
        details: row.get(3)?,
        status: parse_text(4, &status)?,
        created_at: row.get(5)?,
    })
}

/// Insert a pending reservation. Returns its id.
pub async fn create_reservation(
    db: &Database,
    user: UserId,
    location: LocationId,
    details: &str,
) -> Result<ReservationId, RoamerError> {
    let details = details.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reservations (user_id, location_id, details, status)
                 VALUES (?1, ?2, ?3, 'pending')",
                params![user.0, location.0, details],
            )?;
            Ok(ReservationId(conn.last_insert_rowid()))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a reservation by id.
pub async fn get_reservation(
    db: &Database,
    id: ReservationId,
) -> Result<Option<Reservation>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {RESERVATION_COLUMNS} FROM reservations r WHERE r.id = ?1"),
                params![id.0],
                row_to_reservation,
            );
            match result {
                Ok(reservation) => Ok(Some(reservation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a pending reservation to `status`.
///
/// Returns `false` when no pending row with this id exists.
pub async fn transition_reservation(
    db: &Database,
    id: ReservationId,
    status: ReservationStatus,
) -> Result<bool, RoamerError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE reservations
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND status = 'pending'",
                params![status, id.0],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reservations against locations owned by `provider`, newest first.
pub async fn list_provider_reservations(
    db: &Database,
    provider: UserId,
) -> Result<Vec<Reservation>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RESERVATION_COLUMNS}
                 FROM reservations r JOIN locations l ON l.id = r.location_id
                 WHERE l.provider_id = ?1
                 ORDER BY r.id DESC"
            ))?;
            let rows = stmt.query_map(params![provider.0], row_to_reservation)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The newest reservation `user` holds on `location` that was not rejected.
pub async fn latest_open_reservation(
    db: &Database,
    user: UserId,
    location: LocationId,
) -> Result<Option<Reservation>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations r
                     WHERE r.user_id = ?1 AND r.location_id = ?2 AND r.status != 'rejected'
                     ORDER BY r.id DESC LIMIT 1"
                ),
                params![user.0, location.0],
                row_to_reservation,
            );
            match result {
                Ok(reservation) => Ok(Some(reservation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
