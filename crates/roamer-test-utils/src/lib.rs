// SPDX-FileCopyrightText: 2026 Roamer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Roamer integration tests.
//!
//! Provides a mock channel and a harness that wires both bots to temp
//! storage, for fast deterministic tests without Telegram.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with update injection and capture
//! - [`TestHarness`] - Both bots over one temp database and session directory

pub mod harness;
pub mod mock_channel;

pub use harness::TestHarness;
pub use mock_channel::MockChannel;
