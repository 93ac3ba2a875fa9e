//! XChaCha20-Poly1305 authenticated encryption with associated data.
//!
//! Every encrypt call draws a fresh 24-byte nonce from the OS CSPRNG —
//! never a counter, so concurrent callers cannot collide without
//! cross-process coordination. The extended nonce makes random generation
//! safe at any realistic call volume.

use crate::error::{CryptoError, CryptoResult};
use crate::key::KEY_SIZE;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};

/// XChaCha20 nonce length in bytes.
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Ciphertext plus the nonce it was sealed with. The Poly1305 tag is
/// appended to the ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_SIZE],
}

/// Encrypts `plaintext` under `key`, binding `aad` into the tag.
pub fn encrypt_with_aad(key: &[u8; KEY_SIZE], plaintext: &[u8], aad: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));

    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData { ciphertext, nonce })
}

/// Decrypts and verifies. Fails closed: on tag mismatch (wrong key, wrong
/// associated data, or tampered ciphertext) no plaintext is returned.
pub fn decrypt_with_aad(key: &[u8; KEY_SIZE], data: &EncryptedData, aad: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));

    cipher
        .decrypt(
            XNonce::from_slice(&data.nonce),
            Payload {
                msg: data.ciphertext.as_ref(),
                aad,
            },
        )
        .map_err(|_| CryptoError::Decryption)
}
