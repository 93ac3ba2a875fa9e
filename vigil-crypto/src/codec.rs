//! Byte/string conversions used at every wire boundary.
//!
//! Two base64 alphabets are in play: standard (padded) for opaque blobs in
//! JSON bodies, and URL-safe without padding for values that travel in URLs
//! or token payloads. Encoding is total; decoding fails with
//! [`CryptoError::Decode`] on malformed input.

use crate::error::{CryptoError, CryptoResult};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

/// Encodes bytes as standard (padded) base64.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard (padded) base64.
pub fn from_base64(s: &str) -> CryptoResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| CryptoError::Decode(format!("invalid base64: {e}")))
}

/// Encodes bytes as URL-safe base64 without padding.
pub fn to_url_safe_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes URL-safe base64 without padding.
pub fn from_url_safe_base64(s: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| CryptoError::Decode(format!("invalid url-safe base64: {e}")))
}

/// Interprets bytes as UTF-8.
pub fn utf8_to_string(bytes: &[u8]) -> CryptoResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CryptoError::Decode(format!("invalid UTF-8: {e}")))
}
