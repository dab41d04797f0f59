// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits implemented by storage backends.
//!
//! Traits use `#[async_trait]` so the vault and account layer can hold them
//! as `Arc<dyn ...>`.

pub mod directory;
pub mod store;

pub use directory::UserDirectory;
pub use store::CredentialStore;
