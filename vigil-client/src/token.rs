//! Access-token expiry decoding.
//!
//! The access token is an opaque bearer string to this client; its payload
//! is decoded (never validated — the server owns validation) purely to
//! learn the `exp` claim and schedule client-side teardown.

use chrono::{DateTime, Utc};
use vigil_crypto::from_url_safe_base64;

#[derive(serde::Deserialize)]
struct Claims {
    exp: i64,
}

/// Extracts the expiry instant from a JWT-shaped token.
///
/// Returns `None` on any decode failure, which callers treat as "no known
/// client-side expiry" — the session then never auto-expires locally and
/// only the server's own enforcement applies.
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = decode_segment(payload)?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

/// JWT segments are URL-safe base64 without padding, but some issuers pad
/// anyway. Accept both.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    from_url_safe_base64(segment)
        .or_else(|_| from_url_safe_base64(segment.trim_end_matches('=')))
        .ok()
}
