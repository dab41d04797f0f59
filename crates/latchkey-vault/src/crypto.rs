// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encryption into self-contained ciphertext blobs.
//!
//! Blob layout: `version (1) || nonce (12) || ciphertext || tag (16)`.
//! Every call to [`encrypt`] draws a fresh random 96-bit nonce from the
//! system CSPRNG, so encrypting the same plaintext twice yields different
//! blobs. Nonce reuse under one key would be catastrophic for GCM.

use latchkey_core::LatchkeyError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Current blob format version.
pub const BLOB_VERSION: u8 = 1;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

/// Smallest valid blob: header plus tag around an empty plaintext.
pub const MIN_BLOB_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, LatchkeyError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| LatchkeyError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` into a self-contained blob.
pub fn encrypt(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, LatchkeyError> {
    let key = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| LatchkeyError::Internal("failed to generate random nonce".to_string()))?;

    // Seal in place: the buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| LatchkeyError::Internal("AES-256-GCM encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(1 + NONCE_LEN + in_out.len());
    blob.push(BLOB_VERSION);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// A wrong key, truncated blob, unknown version, or any flipped bit fails
/// with [`LatchkeyError::AuthenticationFailure`]; garbage plaintext is never
/// returned.
pub fn decrypt(key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>, LatchkeyError> {
    if blob.len() < MIN_BLOB_LEN || blob[0] != BLOB_VERSION {
        return Err(LatchkeyError::AuthenticationFailure);
    }

    let (nonce_bytes, sealed) = blob[1..].split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| LatchkeyError::AuthenticationFailure)?;

    let key = aead_key(key)?;
    let mut in_out = sealed.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| LatchkeyError::AuthenticationFailure)?;

    Ok(plaintext.to_vec())
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; 32], LatchkeyError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; 32];
    rng.fill(&mut key)
        .map_err(|_| LatchkeyError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}
