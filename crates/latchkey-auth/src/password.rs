// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing into PHC strings.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Version};
use latchkey_core::LatchkeyError;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};

const SALT_LEN: usize = 16;

/// Hash `password` with Argon2id and a fresh random salt.
///
/// The returned PHC string embeds the algorithm, parameters, and salt, so
/// verification does not need the original parameters.
pub fn hash_password(
    password: &SecretString,
    params: argon2::Params,
) -> Result<String, LatchkeyError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt_bytes)
        .map_err(|_| LatchkeyError::Internal("failed to generate password salt".to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| LatchkeyError::Internal(format!("failed to encode password salt: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LatchkeyError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC string.
///
/// A malformed stored hash is an internal error, not a failed login.
pub fn verify_password(password: &SecretString, phc: &str) -> Result<bool, LatchkeyError> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| LatchkeyError::Internal(format!("stored password hash is malformed: {e}")))?;
    match Argon2::default().verify_password(password.expose_secret().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(LatchkeyError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}
