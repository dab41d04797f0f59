// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Latchkey integration tests.
//!
//! [`TestHarness`] wires a temp SQLite database, an open [`Vault`] and an
//! [`Accounts`] layer together with low Argon2 cost so end-to-end tests run
//! quickly.
//!
//! [`Vault`]: latchkey_vault::Vault
//! [`Accounts`]: latchkey_auth::Accounts

pub mod harness;

pub use harness::{secret, TestHarness, TestHarnessBuilder};
