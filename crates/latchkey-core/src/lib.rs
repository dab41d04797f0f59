// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Latchkey credential vault.
//!
//! This crate provides the error taxonomy, record types, and persistence
//! traits shared by the storage, vault, and account crates. Nothing here
//! touches key material or plaintext secrets.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LatchkeyError;
pub use traits::{CredentialStore, UserDirectory};
pub use types::{CredentialRecord, HealthStatus, OwnerId, RecordId, User};
