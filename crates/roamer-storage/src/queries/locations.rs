// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location catalog and photo operations.

use roamer_core::types::{Location, LocationPhoto, LocationQuery, NewLocation};
use roamer_core::{LocationId, RoamerError, UserId};
use rusqlite::params;
use rusqlite::types::Value;

use crate::database::Database;

pub(crate) const LOCATION_COLUMNS: &str =
    "l.id, l.name, l.description, l.category, l.region, l.rating, l.latitude, l.longitude, l.provider_id";

pub(crate) fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: LocationId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        region: row.get(4)?,
        rating: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        provider_id: row.get::<_, Option<i64>>(8)?.map(UserId),
    })
}

/// `true` when a filter value means "no filter".
fn is_wildcard(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("any")
}

/// Escape LIKE metacharacters so the keyword matches literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Insert a location. Returns its new id.
pub async fn insert_location(
    db: &Database,
    location: &NewLocation,
) -> Result<LocationId, RoamerError> {
    let location = location.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO locations
                 (name, description, category, region, rating, latitude, longitude, provider_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    location.name,
                    location.description,
                    location.category,
                    location.region,
                    location.rating,
                    location.latitude,
                    location.longitude,
                    location.provider_id.map(|p| p.0),
                ],
            )?;
            Ok(LocationId(conn.last_insert_rowid()))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a location by id.
pub async fn get_location(
    db: &Database,
    id: LocationId,
) -> Result<Option<Location>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {LOCATION_COLUMNS} FROM locations l WHERE l.id = ?1"),
                params![id.0],
                row_to_location,
            );
            match result {
                Ok(location) => Ok(Some(location)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Search the catalog.
///
/// The keyword matches name or description case-insensitively; category and
/// region match exactly; results are ordered by rating, best first.
pub async fn search_locations(
    db: &Database,
    query: &LocationQuery,
) -> Result<Vec<Location>, RoamerError> {
    let mut sql = format!("SELECT {LOCATION_COLUMNS} FROM locations l WHERE 1 = 1");
    let mut values: Vec<Value> = Vec::new();

    let keyword = query.keyword.trim();
    if !keyword.is_empty() && keyword != "*" {
        let pattern = format!("%{}%", escape_like(&keyword.to_lowercase()));
        sql.push_str(
            " AND (LOWER(l.name) LIKE ? ESCAPE '\\' OR LOWER(l.description) LIKE ? ESCAPE '\\')",
        );
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }
    if !is_wildcard(&query.category) {
        sql.push_str(" AND l.category = ?");
        values.push(Value::Text(query.category.trim().to_string()));
    }
    if !is_wildcard(&query.region) {
        sql.push_str(" AND l.region = ?");
        values.push(Value::Text(query.region.trim().to_string()));
    }
    if query.min_rating > 0.0 {
        sql.push_str(" AND l.rating >= ?");
        values.push(Value::Real(query.min_rating));
    }
    sql.push_str(" ORDER BY l.rating DESC, l.id ASC");
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    }

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(values), row_to_location)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attach a photo reference to a location.
pub async fn add_location_photo(
    db: &Database,
    location: LocationId,
    file_id: &str,
) -> Result<(), RoamerError> {
    let file_id = file_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO location_photos (location_id, file_id) VALUES (?1, ?2)",
                params![location.0, file_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Photos of a location, in upload order.
pub async fn list_location_photos(
    db: &Database,
    location: LocationId,
) -> Result<Vec<LocationPhoto>, RoamerError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, location_id, file_id FROM location_photos
                 WHERE location_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![location.0], |row| {
                Ok(LocationPhoto {
                    id: row.get(0)?,
                    location_id: LocationId(row.get(1)?),
                    file_id: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
