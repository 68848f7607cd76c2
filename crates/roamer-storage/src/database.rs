// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use roamer_core::RoamerError;
use tracing::{debug, info};

use crate::migrations::run_migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the single SQLite writer connection.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and apply
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, RoamerError> {
        Self::open_with(path, true).await
    }

    /// Like [`Database::open`], with the journal mode chosen by `wal_mode`.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, RoamerError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RoamerError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| RoamerError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), RoamerError> {
            let sqlite_err = |e: rusqlite::Error| RoamerError::Storage {
                source: Box::new(e),
            };
            if wal_mode {
                let mode: String = conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(sqlite_err)?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(sqlite_err)?;
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(sqlite_err)?;
            conn.busy_timeout(BUSY_TIMEOUT).map_err(sqlite_err)?;
            run_migrations(conn)
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            _ => RoamerError::Storage {
                source: "database connection closed during setup".into(),
            },
        })?;

        info!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection. Query modules go through `call()`.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued calls to finish.
    pub async fn close(self) -> Result<(), RoamerError> {
        self.conn.close().await.map_err(|e| RoamerError::Storage {
            source: Box::new(e),
        })
    }
}

/// Convert a tokio-rusqlite error into [`RoamerError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RoamerError {
    RoamerError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("roamer.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("schema.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap();

        for table in [
            "users",
            "locations",
            "location_photos",
            "reservations",
            "trips",
            "trip_locations",
            "messages",
            "offer_subscriptions",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("fk.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let result = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO reservations (user_id, location_id) VALUES (999, 999)",
                    [],
                )?;
                Ok(())
            })
            .await;
        assert!(result.is_err(), "dangling reservation should be refused");
        db.close().await.unwrap();
    }
}
