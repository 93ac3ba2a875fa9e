//! Vault-key envelope: the wrapped form of the vault key as stored
//! server-side.
//!
//! The vault key is sealed under the master key with the account email as
//! associated data, so an envelope cannot be swapped between accounts. The
//! unwrap failing is the sole "wrong password" signal — there is no other
//! verifier for the master key on the client.

use crate::cipher::{decrypt_with_aad, encrypt_with_aad, EncryptedData, NONCE_SIZE};
use crate::error::{CryptoError, CryptoResult};
use crate::key::{MasterKey, VaultKey, KEY_SIZE};
use serde::{Deserialize, Serialize};

/// The encrypted vault key plus its nonce. Safe to persist and transmit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultKeyEnvelope {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

impl VaultKeyEnvelope {
    pub fn from_parts(ciphertext: Vec<u8>, nonce: [u8; NONCE_SIZE]) -> Self {
        Self { ciphertext, nonce }
    }

    fn as_encrypted(&self) -> EncryptedData {
        EncryptedData {
            ciphertext: self.ciphertext.clone(),
            nonce: self.nonce,
        }
    }
}

/// Registration path: generates a fresh random vault key and seals it under
/// the master key, bound to `email`.
///
/// The plaintext vault key is handed back for immediate use; it zeroizes
/// itself when dropped.
pub fn wrap_vault_key(email: &str, master_key: &MasterKey) -> CryptoResult<(VaultKey, VaultKeyEnvelope)> {
    let vault_key = VaultKey::generate()?;
    let envelope = seal_vault_key(email, master_key, &vault_key)?;
    Ok((vault_key, envelope))
}

/// Seals an existing vault key under a (possibly new) master key with a
/// fresh nonce. Used by master-password reset, where the vault key — and
/// therefore every record ciphertext — stays the same.
pub fn seal_vault_key(
    email: &str,
    master_key: &MasterKey,
    vault_key: &VaultKey,
) -> CryptoResult<VaultKeyEnvelope> {
    let encrypted = encrypt_with_aad(master_key.key().as_bytes(), vault_key.as_bytes(), email.as_bytes())?;
    Ok(VaultKeyEnvelope {
        ciphertext: encrypted.ciphertext,
        nonce: encrypted.nonce,
    })
}

/// Opens the envelope. Fails closed with [`CryptoError::Decryption`] when
/// the master key is wrong (wrong password) or the email binding does not
/// match.
pub fn unwrap_vault_key(
    email: &str,
    master_key: &MasterKey,
    envelope: &VaultKeyEnvelope,
) -> CryptoResult<VaultKey> {
    let plaintext = decrypt_with_aad(master_key.key().as_bytes(), &envelope.as_encrypted(), email.as_bytes())?;

    let bytes: [u8; KEY_SIZE] =
        plaintext
            .try_into()
            .map_err(|v: Vec<u8>| CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: v.len(),
            })?;

    Ok(VaultKey::from_bytes(bytes))
}
