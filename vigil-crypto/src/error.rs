//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in the encryption layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// AEAD tag verification failed — wrong key, wrong associated data,
    /// or tampered ciphertext. Deliberately carries no detail about which.
    #[error("decryption failed (wrong key or tampered data)")]
    Decryption,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("random generator unavailable: {0}")]
    Rng(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
