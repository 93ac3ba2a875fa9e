//! Key material: salts, Argon2id derivation, master and vault keys.
//!
//! All secret key types implement `ZeroizeOnDrop`, so their backing memory
//! is wiped on every exit path the moment the binding goes out of scope.

use crate::codec::{from_url_safe_base64, to_url_safe_base64};
use crate::error::{CryptoError, CryptoResult};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key length in bytes.
pub const KEY_SIZE: usize = 32;

/// Argon2id salt length in bytes.
pub const SALT_SIZE: usize = 16;

/// Argon2id cost parameters.
///
/// The default is the fixed "moderate" cost (256 MiB, 3 passes, 1 lane)
/// used by every production caller. Registration and verification must run
/// with identical parameters or derived keys will never match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 256 * 1024,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests. Never use outside test code.
    pub fn fast() -> Self {
        Self {
            m_cost: 8,
            t_cost: 1,
            p_cost: 1,
        }
    }
}

/// A 16-byte Argon2id salt. Safe to persist and transmit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Generates a fresh random salt from the OS CSPRNG.
    pub fn random() -> CryptoResult<Self> {
        let mut bytes = [0u8; SALT_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Decodes a salt from its URL-safe base64 wire form.
    pub fn from_url_safe_base64(s: &str) -> CryptoResult<Self> {
        let bytes = from_url_safe_base64(s)?;
        let arr: [u8; SALT_SIZE] =
            bytes
                .try_into()
                .map_err(|v: Vec<u8>| CryptoError::InvalidKeyLength {
                    expected: SALT_SIZE,
                    actual: v.len(),
                })?;
        Ok(Self(arr))
    }

    pub fn to_url_safe_base64(&self) -> String {
        to_url_safe_base64(&self.0)
    }
}

/// A 32-byte symmetric key derived via Argon2id. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; KEY_SIZE]);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Derives a 32-byte key from a password and salt with Argon2id.
///
/// Deterministic: the same `(password, salt, params)` always yields the
/// same key.
pub fn derive_key(password: &str, salt: &Salt, params: &KdfParams) -> CryptoResult<DerivedKey> {
    let params = Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_SIZE))
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut out)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(DerivedKey(out))
}

/// The master key: derived solely from the password and a salt.
///
/// Never transmitted. Held only for the duration of one wrap/unwrap and
/// zeroized on drop.
pub struct MasterKey {
    key: DerivedKey,
    salt: Salt,
}

impl MasterKey {
    /// Derives the master key with the fixed moderate KDF cost.
    ///
    /// When `salt` is `None` (registration, password reset) a fresh random
    /// salt is generated; otherwise (login) the stored salt is used.
    pub fn derive(password: &str, salt: Option<Salt>) -> CryptoResult<Self> {
        let salt = match salt {
            Some(s) => s,
            None => Salt::random()?,
        };
        let key = derive_key(password, &salt, &KdfParams::default())?;
        Ok(Self { key, salt })
    }

    /// Reconstructs a master key from raw parts (test support and key
    /// escrow tooling; production callers go through `derive`).
    pub fn from_parts(key: DerivedKey, salt: Salt) -> Self {
        Self { key, salt }
    }

    pub fn key(&self) -> &DerivedKey {
        &self.key
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }
}

/// The random vault key that encrypts every vault record.
///
/// Generated once at registration, constant for the account's lifetime.
/// Lives in memory only while a session is active; zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    /// Generates a fresh random vault key from the OS CSPRNG.
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}
