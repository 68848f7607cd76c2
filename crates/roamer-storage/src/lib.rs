// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Roamer.
//!
//! WAL-mode SQLite with embedded migrations, a single-writer connection via
//! `tokio-rusqlite`, and typed queries for identities, locations,
//! reservations, trips, chat history, and offer subscriptions.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
