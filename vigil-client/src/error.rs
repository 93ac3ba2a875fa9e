//! Client error types.

use thiserror::Error;
use vigil_crypto::CryptoError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the auth/session layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The external PAKE primitive could not be loaded. Retryable.
    #[error("crypto module initialization failed: {0}")]
    CryptoInit(String),

    /// The PAKE ceremony rejected peer data. Covers both a wrong password
    /// and a malformed/tampered server message; callers must not be able
    /// to tell which.
    #[error("authentication protocol failed: {0}")]
    Protocol(String),

    #[error("malformed data at API boundary: {0}")]
    Decode(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl ClientError {
    /// User-facing message. Cryptographic failure modes are deliberately
    /// collapsed: a wrong password, a tampered server response, and a
    /// failed envelope unwrap all read the same, so the messaging leaks
    /// nothing about which check failed.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Protocol(_)
            | ClientError::Crypto(CryptoError::Decryption)
            | ClientError::AuthRequired => "Authentication failed. Please try again.",
            ClientError::Network(_) => "Cannot reach server. Please check your connection.",
            ClientError::Decode(_)
            | ClientError::Serialization(_)
            | ClientError::Crypto(_) => "Invalid response from server.",
            ClientError::CryptoInit(_) => "Secure module failed to load. Please retry.",
            ClientError::Api(_) => "Request failed. Please try again later.",
        }
    }

    /// True when retrying the same operation may succeed (transport or
    /// module-load failures, as opposed to rejected credentials).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::CryptoInit(_))
    }
}
