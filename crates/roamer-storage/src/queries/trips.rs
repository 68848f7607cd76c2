// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trip and route-order operations.

use std::collections::HashSet;

use roamer_core::types::{Location, Trip, TripLocation};
use roamer_core::{LocationId, RoamerError, TripId, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::queries::locations::{LOCATION_COLUMNS, row_to_location};

fn row_to_trip(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trip> {
    Ok(Trip {
        id: TripId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        name: row.get(2)?,
        status: row.get(3)?,
    })
}

/// Create a draft trip. Returns its id.
pub async fn create_trip(db: &Database, user: UserId, name: &str) -> Result<TripId, RoamerError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO trips (user_id, name, status) VALUES (?1, ?2, 'draft')",
                params![user.0, name],
            )?;
            Ok(TripId(conn.last_insert_rowid()))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a trip by id.
pub async fn get_trip(db: &Database, id: TripId) -> Result<Option<Trip>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, user_id, name, status FROM trips WHERE id = ?1",
                params![id.0],
                row_to_trip,
            );
            match result {
                Ok(trip) => Ok(Some(trip)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recently created trip of `user`.
pub async fn latest_trip(db: &Database, user: UserId) -> Result<Option<Trip>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, user_id, name, status FROM trips
                 WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
                params![user.0],
                row_to_trip,
            );
            match result {
                Ok(trip) => Ok(Some(trip)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Append a location at the end of a trip.
///
/// Returns the assigned order index, or `None` if the location was already
/// on the trip.
pub async fn add_trip_location(
    db: &Database,
    trip: TripId,
    location: LocationId,
) -> Result<Option<i64>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let next: i64 = tx.query_row(
                "SELECT COALESCE(MAX(order_index), 0) + 1 FROM trip_locations WHERE trip_id = ?1",
                params![trip.0],
                |row| row.get(0),
            )?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO trip_locations (trip_id, location_id, order_index)
                 VALUES (?1, ?2, ?3)",
                params![trip.0, location.0, next],
            )?;
            tx.commit()?;
            Ok((inserted == 1).then_some(next))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Locations of a trip in route order.
pub async fn trip_locations(db: &Database, trip: TripId) -> Result<Vec<Location>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOCATION_COLUMNS}
                 FROM trip_locations tl JOIN locations l ON l.id = tl.location_id
                 WHERE tl.trip_id = ?1
                 ORDER BY tl.order_index, tl.id"
            ))?;
            let rows = stmt.query_map(params![trip.0], row_to_location)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Raw links of a trip in route order.
pub async fn trip_links(db: &Database, trip: TripId) -> Result<Vec<TripLocation>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT trip_id, location_id, order_index FROM trip_locations
                 WHERE trip_id = ?1 ORDER BY order_index, id",
            )?;
            let rows = stmt.query_map(params![trip.0], |row| {
                Ok(TripLocation {
                    trip_id: TripId(row.get(0)?),
                    location_id: LocationId(row.get(1)?),
                    order_index: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Give `order[i]` the index `i + 1`, all in one transaction.
///
/// `order` must name every location of the trip exactly once. If the link
/// count differs or any update does not touch exactly one row, the
/// transaction is dropped uncommitted and nothing changes.
pub async fn reorder_trip(
    db: &Database,
    trip: TripId,
    order: &[LocationId],
) -> Result<(), RoamerError> {
    let mut seen = HashSet::with_capacity(order.len());
    if let Some(dup) = order.iter().find(|id| !seen.insert(**id)) {
        return Err(RoamerError::Internal(format!(
            "route order for trip {trip} names location {dup} twice"
        )));
    }

    let order: Vec<i64> = order.iter().map(|id| id.0).collect();
    let stops = order.len();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let links: i64 = tx.query_row(
                "SELECT COUNT(*) FROM trip_locations WHERE trip_id = ?1",
                params![trip.0],
                |row| row.get(0),
            )?;
            if usize::try_from(links).ok() != Some(order.len()) {
                return Err(rusqlite::Error::StatementChangedRows(order.len()));
            }
            {
                let mut stmt = tx.prepare(
                    "UPDATE trip_locations SET order_index = ?1
                     WHERE trip_id = ?2 AND location_id = ?3",
                )?;
                for (position, location) in order.iter().enumerate() {
                    let index = i64::try_from(position + 1).unwrap_or(i64::MAX);
                    let changed = stmt.execute(params![index, trip.0, location])?;
                    if changed != 1 {
                        return Err(rusqlite::Error::StatementChangedRows(changed));
                    }
                }
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    tracing::debug!(trip_id = trip.0, stops, "route order written");
    Ok(())
}
