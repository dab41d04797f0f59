// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Latchkey credential vault.
//!
//! No variant carries a plaintext secret or key material. Store and cipher
//! failures propagate unchanged to the vault facade, which reports them using
//! this taxonomy.

use strum::{Display, EnumString};
use thiserror::Error;

/// The error type shared by every Latchkey crate.
#[derive(Debug, Error)]
pub enum LatchkeyError {
    /// Missing or unusable configuration (no master secret, bad KDF params,
    /// master secret that does not match the vault). Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// The owner could not be resolved, or a login was rejected.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The `(owner, site, login)` triple is already stored.
    #[error("credential already stored for {login} at {site}")]
    DuplicateRecord { site: String, login: String },

    /// A ciphertext blob failed to authenticate under the supplied key
    /// (wrong owner key, truncated or tampered blob).
    #[error("authentication failure: ciphertext could not be verified")]
    AuthenticationFailure,

    /// Persistence layer failure (connection, query, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Registration attempted with a username that already exists.
    #[error("username `{username}` is already registered")]
    UsernameTaken { username: String },

    /// Rejected account input (empty username, short password).
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors (RNG failure, KDF parameter errors).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`LatchkeyError`], used by callers that map
/// errors onto their own surfaces (exit codes, HTTP status, log fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    NotAuthenticated,
    DuplicateRecord,
    AuthenticationFailure,
    Storage,
    Account,
    Internal,
}

impl LatchkeyError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::DuplicateRecord { .. } => ErrorKind::DuplicateRecord,
            Self::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::UsernameTaken { .. } | Self::Validation(_) => ErrorKind::Account,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
