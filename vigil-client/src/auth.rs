//! Authentication orchestrators.
//!
//! [`AuthFlow`] sequences the multi-step ceremonies — registration, login,
//! re-authentication, master-password reset — across the PAKE adapter, the
//! KDF, and the REST API. Each flow is a straight line: any failed step
//! aborts the whole ceremony and the in-flight client state is discarded,
//! never reused for a retry.
//!
//! Key lifetimes are scoped to the flow: the master key exists only between
//! derivation and the envelope operation that consumes it, and is wiped
//! when it drops.

use crate::api::AuthApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pake::PakeClient;
use crate::session::SessionManager;
use crate::types::*;
use tracing::{debug, info};
use vigil_crypto::{
    from_url_safe_base64, seal_vault_key, to_url_safe_base64, unwrap_vault_key, wrap_vault_key,
    MasterKey, Salt, VaultKey, VaultKeyEnvelope, NONCE_SIZE,
};
use zeroize::Zeroize;

/// Everything a successful login yields: the bearer token, the decrypted
/// vault key, and the user's profile. Handed to
/// [`SessionManager::establish`], which takes ownership of the key.
pub struct LoginSuccess {
    pub access_token: String,
    pub vault_key: VaultKey,
    pub user: UserInfo,
}

// Manual Debug: the vault key and bearer token are secrets and must never
// appear in logs or panic messages.
impl std::fmt::Debug for LoginSuccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSuccess")
            .field("access_token", &"[REDACTED]")
            .field("vault_key", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// The authentication flows, generic over the API transport.
pub struct AuthFlow<A: AuthApi> {
    pake: PakeClient,
    api: A,
    config: ClientConfig,
}

impl<A: AuthApi> AuthFlow<A> {
    pub fn new(pake: PakeClient, api: A, config: ClientConfig) -> Self {
        Self { pake, api, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates an account.
    ///
    /// Runs the PAKE registration ceremony, derives a master key from the
    /// password under a fresh salt, wraps a brand-new random vault key, and
    /// submits the record. The server never sees the password, the master
    /// key, or the plaintext vault key — only the PAKE verifier and the
    /// sealed envelope.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<UserInfo> {
        debug!(email, "starting registration ceremony");
        let start = self.pake.start_registration(password).await?;
        let resp = self
            .api
            .register_start(&RegisterStartRequest {
                email: email.to_string(),
                registration_request: start.request,
            })
            .await?;

        let finish = self
            .pake
            .finish_registration(email, &start.client_state, &resp.registration_response)
            .await?;

        let master_key = derive_master_key(password.to_string(), None).await?;
        let (vault_key, envelope) = wrap_vault_key(email, &master_key)?;
        let salt_b64 = master_key.salt().to_url_safe_base64();
        drop(master_key);
        // Registration does not open a session; the plaintext vault key is
        // wiped immediately and recovered at first login.
        drop(vault_key);

        let result = self
            .api
            .register_finish(&RegisterFinishRequest {
                user_info: UserInfo {
                    id: None,
                    full_name: full_name.to_string(),
                    email: email.to_string(),
                },
                master_key_salt: salt_b64,
                encrypted_vault_key: to_url_safe_base64(&envelope.ciphertext),
                vault_key_nonce: to_url_safe_base64(&envelope.nonce),
                master_key_verifier: finish.registration_record,
            })
            .await?;

        if !result.status {
            return Err(ClientError::Api("registration rejected".to_string()));
        }

        info!(email, "registration complete");
        result
            .user_info
            .ok_or_else(|| ClientError::Decode("registration response missing user info".to_string()))
    }

    /// Authenticates and recovers the vault key.
    ///
    /// The PAKE ceremony proves the password without revealing it; the
    /// finish response then carries the stored salt and envelope, from
    /// which the master key is re-derived and the vault key unwrapped.
    /// A wrong password fails at the PAKE finish step; a correct PAKE run
    /// with a corrupted envelope fails at the unwrap — both surface to the
    /// user as the same generic authentication failure.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginSuccess> {
        debug!(email, "starting login ceremony");
        let start = self.pake.start_login(password).await?;
        let resp = self
            .api
            .login_start(&LoginStartRequest {
                email: email.to_string(),
                login_request: start.request,
            })
            .await?;

        let finish = self
            .pake
            .finish_login(email, password, &start.client_state, &resp.login_response)
            .await?;

        let resp = self
            .api
            .login_finish(&LoginFinishRequest {
                email: email.to_string(),
                finish_login_request: finish.finish_request,
            })
            .await?;

        if !resp.status {
            return Err(ClientError::Protocol("server rejected login".to_string()));
        }

        let salt = Salt::from_url_safe_base64(&resp.master_key_salt)?;
        let master_key = derive_master_key(password.to_string(), Some(salt)).await?;
        let envelope = decode_envelope(&resp.encrypted_vault_key, &resp.vault_key_nonce)?;
        let vault_key = unwrap_vault_key(email, &master_key, &envelope)?;

        info!(email, "login complete");
        Ok(LoginSuccess {
            access_token: resp.access_token,
            vault_key,
            user: resp.user,
        })
    }

    /// Re-authenticates the current session's user with a freshly entered
    /// password and refreshes the session in place.
    pub async fn reauthenticate(
        &self,
        session: &SessionManager,
        password: &str,
    ) -> ClientResult<()> {
        let user = session.user().await.ok_or(ClientError::AuthRequired)?;
        let login = self.login(&user.email, password).await?;
        session.complete_reauth(login).await;
        Ok(())
    }

    /// Convenience: login and establish the session in one step.
    pub async fn login_and_establish(
        &self,
        session: &SessionManager,
        email: &str,
        password: &str,
    ) -> ClientResult<()> {
        let login = self.login(email, password).await?;
        session.establish(login).await;
        Ok(())
    }

    /// Changes the master password without touching any record ciphertext.
    ///
    /// The vault key is unwrapped under the current password, re-sealed
    /// under a master key derived from the new password with a fresh salt,
    /// and a new PAKE verifier is registered. The vault key itself never
    /// changes, so every stored record stays valid.
    ///
    /// The envelope unwrap is the only check of the current password: if it
    /// fails, nothing is sent to the server.
    pub async fn reset_master_password(
        &self,
        user_id: i64,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<()> {
        debug!(user_id, "starting master password reset");
        let record = self.api.get_user_record(user_id).await?;
        let (salt_b64, ciphertext_b64, nonce_b64) = match (
            record.master_key_salt,
            record.encrypted_vault_key,
            record.vault_key_nonce,
        ) {
            (Some(salt), Some(ct), Some(nonce)) => (salt, ct, nonce),
            _ => {
                return Err(ClientError::Decode(
                    "account record missing key material".to_string(),
                ))
            }
        };

        let salt = Salt::from_url_safe_base64(&salt_b64)?;
        let old_master = derive_master_key(current_password.to_string(), Some(salt)).await?;
        let envelope = decode_envelope(&ciphertext_b64, &nonce_b64)?;
        let vault_key = unwrap_vault_key(email, &old_master, &envelope)?;
        drop(old_master);

        let new_master = derive_master_key(new_password.to_string(), None).await?;
        let new_envelope = seal_vault_key(email, &new_master, &vault_key)?;
        let new_salt_b64 = new_master.salt().to_url_safe_base64();
        drop(new_master);
        drop(vault_key);

        let start = self.pake.start_registration(new_password).await?;
        let resp = self
            .api
            .reset_start(&ResetStartRequest {
                email: email.to_string(),
                registration_request: start.request,
            })
            .await?;

        let finish = self
            .pake
            .finish_registration(email, &start.client_state, &resp.registration_response)
            .await?;

        let result = self
            .api
            .reset_finish(&ResetFinishRequest {
                user_id,
                master_key_salt: new_salt_b64,
                encrypted_vault_key: to_url_safe_base64(&new_envelope.ciphertext),
                vault_key_nonce: to_url_safe_base64(&new_envelope.nonce),
                master_key_verifier: finish.registration_record,
            })
            .await?;

        if !result.status {
            return Err(ClientError::Api("master password reset rejected".to_string()));
        }

        info!(user_id, "master password reset complete");
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Runs the memory-hard KDF off the async runtime. The owned password copy
/// is wiped inside the worker before it returns.
async fn derive_master_key(
    mut password: String,
    salt: Option<Salt>,
) -> ClientResult<MasterKey> {
    let master_key = tokio::task::spawn_blocking(move || {
        let result = MasterKey::derive(&password, salt);
        password.zeroize();
        result
    })
    .await
    .map_err(|e| ClientError::CryptoInit(format!("key derivation task failed: {e}")))??;

    Ok(master_key)
}

/// Rebuilds a vault-key envelope from its wire-encoded fields.
fn decode_envelope(ciphertext_b64: &str, nonce_b64: &str) -> ClientResult<VaultKeyEnvelope> {
    let ciphertext = from_url_safe_base64(ciphertext_b64)?;
    let nonce_bytes = from_url_safe_base64(nonce_b64)?;
    let nonce: [u8; NONCE_SIZE] = nonce_bytes.try_into().map_err(|v: Vec<u8>| {
        ClientError::Decode(format!("vault key nonce has length {}", v.len()))
    })?;
    Ok(VaultKeyEnvelope::from_parts(ciphertext, nonce))
}
