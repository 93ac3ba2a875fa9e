//! Wire types for the auth/user REST endpoints.
//!
//! Bodies are snake_case JSON; every binary field travels as a URL-safe
//! base64 string without padding.

use serde::{Deserialize, Serialize};

/// Public user profile fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<i64>,
    pub full_name: String,
    pub email: String,
}

// ── Registration ──

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterStartRequest {
    pub email: String,
    pub registration_request: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterStartResponse {
    pub registration_response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterFinishRequest {
    pub user_info: UserInfo,
    pub master_key_salt: String,
    pub encrypted_vault_key: String,
    pub vault_key_nonce: String,
    /// The PAKE registration record; the server stores it as the password
    /// verifier. Never a hash of the password itself.
    pub master_key_verifier: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: bool,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

// ── Login ──

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginStartRequest {
    pub email: String,
    pub login_request: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginStartResponse {
    pub login_response: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginFinishRequest {
    pub email: String,
    pub finish_login_request: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginFinishResponse {
    pub status: bool,
    pub access_token: String,
    pub master_key_salt: String,
    pub encrypted_vault_key: String,
    pub vault_key_nonce: String,
    pub user: UserInfo,
}

// ── Master-password reset ──

/// The stored account record needed to begin a reset: the same salt /
/// envelope / nonce triple the login finish response carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecordResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub master_key_salt: Option<String>,
    #[serde(default)]
    pub encrypted_vault_key: Option<String>,
    #[serde(default)]
    pub vault_key_nonce: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResetStartRequest {
    pub email: String,
    pub registration_request: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResetFinishRequest {
    pub user_id: i64,
    pub master_key_salt: String,
    pub encrypted_vault_key: String,
    pub vault_key_nonce: String,
    pub master_key_verifier: String,
}
