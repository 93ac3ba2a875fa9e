//! Shared test fixtures: a deterministic PAKE suite and an in-memory
//! server implementing the API trait.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vigil_client::api::AuthApi;
use vigil_client::pake::{
    PakeClient, PakeCredentials, PakeIdentities, PakeRegistration, PakeRequest, PakeSuite,
};
use vigil_client::types::*;
use vigil_client::{ClientConfig, ClientError, ClientResult};
use vigil_crypto::{from_url_safe_base64, to_url_safe_base64, utf8_to_string};

/// Builds a JWT-shaped token whose payload carries the given expiry.
pub fn make_token(expires_at: DateTime<Utc>) -> String {
    let header = to_url_safe_base64(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = to_url_safe_base64(format!(r#"{{"exp":{}}}"#, expires_at.timestamp()).as_bytes());
    format!("{header}.{payload}.testsig")
}

// ── Mock PAKE suite ──
//
// Deterministic stand-in for the real primitive. The "verifier" is a
// string derived from the password and identities; login succeeds only
// when the server's response embeds the verifier the entered password
// regenerates, plus the matching context string. That reproduces the
// properties the flows rely on: wrong password, tampered response, and
// context mismatch are all the same opaque failure.

pub struct MockPakeSuite;

fn ceremony_failure() -> ClientError {
    ClientError::Protocol("ceremony failed".to_string())
}

fn verifier_for(password: &str, ids: &PakeIdentities) -> String {
    format!("verifier:{password}:{}:{}", ids.client, ids.server)
}

impl PakeSuite for MockPakeSuite {
    fn create_registration_request(&self, password: &str) -> ClientResult<PakeRequest> {
        Ok(PakeRequest {
            message: format!("reg-req:{password}").into_bytes(),
            state: format!("reg-state:{password}").into_bytes(),
        })
    }

    fn finalize_registration(
        &self,
        state: &[u8],
        response: &[u8],
        ids: &PakeIdentities,
    ) -> ClientResult<PakeRegistration> {
        let state = utf8_to_string(state)?;
        let password = state
            .strip_prefix("reg-state:")
            .ok_or_else(ceremony_failure)?;
        if response != b"reg-resp" {
            return Err(ceremony_failure());
        }
        Ok(PakeRegistration {
            record: verifier_for(password, ids).into_bytes(),
            export_key: vec![1u8; 32],
        })
    }

    fn create_credential_request(&self, password: &str) -> ClientResult<PakeRequest> {
        Ok(PakeRequest {
            message: format!("login-req:{password}").into_bytes(),
            state: format!("login-state:{password}").into_bytes(),
        })
    }

    fn recover_credentials(
        &self,
        password: &str,
        state: &[u8],
        response: &[u8],
        context: &str,
        ids: &PakeIdentities,
    ) -> ClientResult<PakeCredentials> {
        if state != format!("login-state:{password}").as_bytes() {
            return Err(ceremony_failure());
        }
        let expected = format!("login-resp:{}:{context}", verifier_for(password, ids));
        if response != expected.as_bytes() {
            return Err(ceremony_failure());
        }
        Ok(PakeCredentials {
            session_key: vec![2u8; 32],
            finish_message: format!("login-finish:{}", ids.client).into_bytes(),
            export_key: vec![3u8; 32],
        })
    }
}

/// A PAKE client whose loader always yields the mock suite.
pub fn mock_pake(config: &ClientConfig) -> PakeClient {
    PakeClient::new(config, || async {
        Ok(Arc::new(MockPakeSuite) as Arc<dyn PakeSuite>)
    })
}

// ── In-memory server ──

#[derive(Clone)]
struct StoredUser {
    id: i64,
    full_name: String,
    email: String,
    verifier: String,
    master_key_salt: String,
    encrypted_vault_key: String,
    vault_key_nonce: String,
}

/// Implements [`AuthApi`] against an in-memory user table, speaking the
/// mock suite's ceremony format.
pub struct InMemoryServer {
    users: Mutex<HashMap<String, StoredUser>>,
    next_id: AtomicI64,
    context: String,
    pub reset_finish_calls: AtomicUsize,
}

impl InMemoryServer {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            context: config.login_context(),
            reset_finish_calls: AtomicUsize::new(0),
        }
    }

    /// Flips a byte in the stored vault-key envelope, simulating stored
    /// data corruption that the PAKE ceremony cannot detect.
    pub fn corrupt_envelope(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(email).expect("user exists");
        let mut bytes = from_url_safe_base64(&user.encrypted_vault_key).unwrap();
        bytes[0] ^= 0xff;
        user.encrypted_vault_key = to_url_safe_base64(&bytes);
    }

    fn user_info(user: &StoredUser) -> UserInfo {
        UserInfo {
            id: Some(user.id),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl AuthApi for InMemoryServer {
    async fn register_start(
        &self,
        _req: &RegisterStartRequest,
    ) -> ClientResult<RegisterStartResponse> {
        Ok(RegisterStartResponse {
            registration_response: to_url_safe_base64(b"reg-resp"),
        })
    }

    async fn register_finish(&self, req: &RegisterFinishRequest) -> ClientResult<StatusResponse> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&req.user_info.email) {
            return Ok(StatusResponse {
                status: false,
                user_info: None,
            });
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = StoredUser {
            id,
            full_name: req.user_info.full_name.clone(),
            email: req.user_info.email.clone(),
            verifier: req.master_key_verifier.clone(),
            master_key_salt: req.master_key_salt.clone(),
            encrypted_vault_key: req.encrypted_vault_key.clone(),
            vault_key_nonce: req.vault_key_nonce.clone(),
        };
        let info = Self::user_info(&user);
        users.insert(user.email.clone(), user);
        Ok(StatusResponse {
            status: true,
            user_info: Some(info),
        })
    }

    async fn login_start(&self, req: &LoginStartRequest) -> ClientResult<LoginStartResponse> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(&req.email)
            .ok_or_else(|| ClientError::Protocol("unknown user".to_string()))?;
        let verifier = utf8_to_string(&from_url_safe_base64(&user.verifier)?)?;
        Ok(LoginStartResponse {
            login_response: to_url_safe_base64(
                format!("login-resp:{verifier}:{}", self.context).as_bytes(),
            ),
        })
    }

    async fn login_finish(&self, req: &LoginFinishRequest) -> ClientResult<LoginFinishResponse> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(&req.email)
            .ok_or_else(|| ClientError::Protocol("unknown user".to_string()))?;
        let finish = from_url_safe_base64(&req.finish_login_request)?;
        if finish != format!("login-finish:{}", req.email).as_bytes() {
            return Err(ClientError::Protocol("bad finish message".to_string()));
        }
        Ok(LoginFinishResponse {
            status: true,
            access_token: make_token(Utc::now() + Duration::minutes(30)),
            master_key_salt: user.master_key_salt.clone(),
            encrypted_vault_key: user.encrypted_vault_key.clone(),
            vault_key_nonce: user.vault_key_nonce.clone(),
            user: Self::user_info(user),
        })
    }

    async fn get_user_record(&self, user_id: i64) -> ClientResult<UserRecordResponse> {
        let users = self.users.lock().unwrap();
        let user = users
            .values()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ClientError::Api("user not found".to_string()))?;
        Ok(UserRecordResponse {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            master_key_salt: Some(user.master_key_salt.clone()),
            encrypted_vault_key: Some(user.encrypted_vault_key.clone()),
            vault_key_nonce: Some(user.vault_key_nonce.clone()),
        })
    }

    async fn reset_start(&self, _req: &ResetStartRequest) -> ClientResult<RegisterStartResponse> {
        Ok(RegisterStartResponse {
            registration_response: to_url_safe_base64(b"reg-resp"),
        })
    }

    async fn reset_finish(&self, req: &ResetFinishRequest) -> ClientResult<StatusResponse> {
        self.reset_finish_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let user = users
            .values_mut()
            .find(|u| u.id == req.user_id)
            .ok_or_else(|| ClientError::Api("user not found".to_string()))?;
        user.verifier = req.master_key_verifier.clone();
        user.master_key_salt = req.master_key_salt.clone();
        user.encrypted_vault_key = req.encrypted_vault_key.clone();
        user.vault_key_nonce = req.vault_key_nonce.clone();
        Ok(StatusResponse {
            status: true,
            user_info: None,
        })
    }
}
