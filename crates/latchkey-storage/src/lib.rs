// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Latchkey credential vault.
//!
//! WAL-mode SQLite with embedded migrations, a single-writer concurrency
//! model via `tokio-rusqlite`, and typed queries for users, encrypted
//! credential records, and vault metadata.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
