//! Per-record encryption of vault secrets.
//!
//! Each record (login id + password) is serialized to canonical JSON and
//! sealed under the vault key with the owning user's id as associated data,
//! so a ciphertext cannot be replayed into another account even when both
//! accounts share server infrastructure.

use crate::cipher::{decrypt_with_aad, encrypt_with_aad, EncryptedData};
use crate::error::CryptoResult;
use crate::key::VaultKey;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// One decrypted vault secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub login_id: String,
    pub password: String,
    pub user_id: i64,
}

fn user_id_aad(user_id: i64) -> Vec<u8> {
    user_id.to_string().into_bytes()
}

/// Encrypts a record under the vault key, bound to `record.user_id`.
/// A fresh random nonce is drawn per call.
pub fn encrypt_record(vault_key: &VaultKey, record: &VaultRecord) -> CryptoResult<EncryptedData> {
    let mut plaintext = serde_json::to_vec(record)?;
    let result = encrypt_with_aad(vault_key.as_bytes(), &plaintext, &user_id_aad(record.user_id));
    plaintext.zeroize();
    result
}

/// Decrypts a record. Fails closed on tag mismatch — corrupted data, wrong
/// vault key, or wrong `user_id` binding all look the same.
pub fn decrypt_record(
    vault_key: &VaultKey,
    data: &EncryptedData,
    user_id: i64,
) -> CryptoResult<VaultRecord> {
    let mut plaintext = decrypt_with_aad(vault_key.as_bytes(), data, &user_id_aad(user_id))?;
    let record = serde_json::from_slice(&plaintext);
    plaintext.zeroize();
    Ok(record?)
}
