// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key derivation.
//!
//! Two stages:
//! 1. [`derive_root_key`]: Argon2id (`Algorithm::Argon2id`, `Version::V0x13`)
//!    stretches the master secret with a per-vault random salt.
//! 2. [`derive_owner_key`]: HKDF-SHA256 expands the root key into an
//!    independent 32-byte key per owner id.

use latchkey_config::model::VaultConfig;
use latchkey_core::{LatchkeyError, OwnerId};
use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of the Argon2id salt stored in vault metadata.
pub const SALT_LEN: usize = 16;

/// HKDF extract salt. Fixed per application so derivation stays deterministic.
const OWNER_KEY_SALT: &[u8] = b"latchkey owner-key salt v1";

/// HKDF info prefix; the big-endian owner id follows it.
const OWNER_KEY_INFO: &[u8] = b"latchkey/credential-key/v1";

/// Argon2id cost parameters, persisted with the vault so later opens reuse
/// the values the root key was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&VaultConfig> for KdfParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            memory_cost: config.kdf_memory_cost,
            iterations: config.kdf_iterations,
            parallelism: config.kdf_parallelism,
        }
    }
}

impl KdfParams {
    /// Serialize as the JSON document stored under `kdf_params`.
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::json!({
            "memory_cost": self.memory_cost,
            "iterations": self.iterations,
            "parallelism": self.parallelism,
        })
        .to_string()
        .into_bytes()
    }

    /// Parse the JSON document stored under `kdf_params`.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, LatchkeyError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| LatchkeyError::Config(format!("corrupted KDF params: {e}")))?;

        let field = |name: &str| -> Result<u32, LatchkeyError> {
            value[name]
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| LatchkeyError::Config(format!("missing {name} in KDF params")))
        };

        Ok(Self {
            memory_cost: field("memory_cost")?,
            iterations: field("iterations")?,
            parallelism: field("parallelism")?,
        })
    }
}

/// Stretch the master secret into the 32-byte vault root key.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_root_key(
    master_secret: &[u8],
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, LatchkeyError> {
    if master_secret.is_empty() {
        return Err(LatchkeyError::Config(
            "no master secret configured".to_string(),
        ));
    }

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| LatchkeyError::Config(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 =
        argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(master_secret, salt, &mut output[..])
        .map_err(|e| LatchkeyError::Internal(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Derive the symmetric key for one owner from the root key.
///
/// Deterministic for a given `(root_key, owner)`. Distinct owner ids feed
/// distinct HKDF info strings, so their keys are independent, and the root
/// key cannot be recovered from a derived key.
pub fn derive_owner_key(
    root_key: &[u8; 32],
    owner: OwnerId,
) -> Result<Zeroizing<[u8; 32]>, LatchkeyError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, OWNER_KEY_SALT).extract(root_key);

    let owner_bytes = owner.0.to_be_bytes();
    let info: [&[u8]; 2] = [OWNER_KEY_INFO, &owner_bytes];
    let okm = prk
        .expand(&info, hkdf::HKDF_SHA256)
        .map_err(|_| LatchkeyError::Internal("HKDF expand failed".to_string()))?;

    let mut key = Zeroizing::new([0u8; 32]);
    okm.fill(&mut key[..])
        .map_err(|_| LatchkeyError::Internal("HKDF output fill failed".to_string()))?;
    Ok(key)
}

/// Generate a random salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], LatchkeyError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| LatchkeyError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Low cost for fast tests.
    const TEST_PARAMS: KdfParams = KdfParams {
        memory_cost: 32768,
        iterations: 2,
        parallelism: 1,
    };

    #[test]
    fn root_key_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_root_key(b"master", &salt, TEST_PARAMS).unwrap();
        let key2 = derive_root_key(b"master", &salt, TEST_PARAMS).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn root_key_depends_on_secret_and_salt() {
        let base = derive_root_key(b"master", &[1u8; SALT_LEN], TEST_PARAMS).unwrap();
        let other_secret = derive_root_key(b"other", &[1u8; SALT_LEN], TEST_PARAMS).unwrap();
        let other_salt = derive_root_key(b"master", &[2u8; SALT_LEN], TEST_PARAMS).unwrap();
        assert_ne!(*base, *other_secret);
        assert_ne!(*base, *other_salt);
    }

    #[test]
    fn empty_master_secret_is_a_configuration_error() {
        let err = derive_root_key(b"", &[0u8; SALT_LEN], TEST_PARAMS).unwrap_err();
        assert!(matches!(err, LatchkeyError::Config(_)));
    }

    #[test]
    fn invalid_params_are_a_configuration_error() {
        let params = KdfParams {
            memory_cost: 1,
            iterations: 0,
            parallelism: 0,
        };
        let err = derive_root_key(b"master", &[0u8; SALT_LEN], params).unwrap_err();
        assert!(matches!(err, LatchkeyError::Config(_)));
    }

    #[test]
    fn owner_key_is_deterministic_per_owner() {
        let root = [7u8; 32];
        let a1 = derive_owner_key(&root, OwnerId(42)).unwrap();
        let a2 = derive_owner_key(&root, OwnerId(42)).unwrap();
        assert_eq!(*a1, *a2);
    }

    #[test]
    fn owner_keys_do_not_collide() {
        let root = [7u8; 32];
        let mut seen = std::collections::HashSet::new();
        for id in (-5..500).chain([i64::MIN, i64::MAX]) {
            let key = derive_owner_key(&root, OwnerId(id)).unwrap();
            assert!(seen.insert(*key), "owner {id} collided");
        }
    }

    #[test]
    fn owner_key_differs_from_root_key() {
        let root = [7u8; 32];
        let key = derive_owner_key(&root, OwnerId(1)).unwrap();
        assert_ne!(*key, root);
    }

    #[test]
    fn owner_key_depends_on_root_key() {
        let a = derive_owner_key(&[1u8; 32], OwnerId(1)).unwrap();
        let b = derive_owner_key(&[2u8; 32], OwnerId(1)).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn kdf_params_json_roundtrip() {
        let bytes = TEST_PARAMS.to_json_bytes();
        assert_eq!(KdfParams::from_json_bytes(&bytes).unwrap(), TEST_PARAMS);
    }

    #[test]
    fn kdf_params_missing_field_is_rejected() {
        let err = KdfParams::from_json_bytes(br#"{"memory_cost": 32768}"#).unwrap_err();
        assert!(err.to_string().contains("iterations"));
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
