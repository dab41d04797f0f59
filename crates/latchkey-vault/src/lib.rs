// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM credential vault with per-owner derived keys.
//!
//! The master secret is stretched once with Argon2id into a root key held in
//! memory by the open [`Vault`]. Each owner's key is derived from the root
//! key with HKDF-SHA256 for the duration of a single operation and is never
//! stored. Stored records hold only self-contained ciphertext blobs.

pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod vault;

pub use prompt::{
    get_account_password, get_master_secret, master_secret_from_env_or_config, prompt_secret,
};
pub use vault::{
    mask_secret, CorruptedCredential, DecryptedCredential, SaveOutcome, Vault, VaultEntry,
};
