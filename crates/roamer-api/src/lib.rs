// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only HTTP listing API.
//!
//! Serves the location catalogue and registered users as JSON, next to a
//! health endpoint, straight from the shared store.

pub mod handlers;
pub mod server;

pub use server::{ApiState, router, start_server};
