// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity operations.

use roamer_core::types::{ContactProfile, User};
use roamer_core::{ExternalId, Role, RoamerError, UserId};
use rusqlite::params;

use crate::database::Database;
use crate::queries::parse_text;

const USER_COLUMNS: &str = "id, external_id, username, first_name, last_name, role";

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(5)?;
    Ok(User {
        id: UserId(row.get(0)?),
        external_id: ExternalId(row.get(1)?),
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: parse_text(5, &role)?,
    })
}

fn optional<T>(result: rusqlite::Result<T>) -> rusqlite::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Return the identity for `profile.external_id`, inserting it with the
/// requester role on first contact. Names are not refreshed on later contacts.
pub async fn resolve_or_create_user(
    db: &Database,
    profile: &ContactProfile,
) -> Result<User, RoamerError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (external_id, username, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(external_id) DO NOTHING",
                params![
                    profile.external_id.0,
                    profile.username,
                    profile.first_name,
                    profile.last_name,
                ],
            )?;
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = ?1"),
                params![profile.external_id.0],
                row_to_user,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an identity by internal id.
pub async fn get_user(db: &Database, id: UserId) -> Result<Option<User>, RoamerError> {
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.0],
                row_to_user,
            ))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an identity by messaging-platform handle.
pub async fn get_user_by_external_id(
    db: &Database,
    external_id: ExternalId,
) -> Result<Option<User>, RoamerError> {
    db.connection()
        .call(move |conn| {
            optional(conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE external_id = ?1"),
                params![external_id.0],
                row_to_user,
            ))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All identities holding `role`, oldest first.
pub async fn list_users_by_role(db: &Database, role: Role) -> Result<Vec<User>, RoamerError> {
    let role = role.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![role], row_to_user)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Assign a role. Fails with `NotFound` for an unknown id.
pub async fn set_user_role(db: &Database, id: UserId, role: Role) -> Result<(), RoamerError> {
    let role_text = role.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET role = ?1 WHERE id = ?2",
                params![role_text, id.0],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(RoamerError::not_found("user", id));
    }
    tracing::info!(user_id = id.0, %role, "role assigned");
    Ok(())
}
