// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per stored entity.

pub mod locations;
pub mod messages;
pub mod reservations;
pub mod subscriptions;
pub mod trips;
pub mod users;

use std::str::FromStr;

/// Parse an enum stored as TEXT, reporting a bad value as a column conversion error.
pub(crate) fn parse_text<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
