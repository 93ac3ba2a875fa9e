//! The REST boundary for auth and account endpoints.
//!
//! [`AuthApi`] is the seam the orchestrators talk through; [`HttpAuthApi`]
//! is the reqwest implementation with bearer-token injection and an
//! on-unauthorized hook the session manager wires to teardown.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::*;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// The auth/user endpoints the orchestrators call.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    async fn register_start(&self, req: &RegisterStartRequest) -> ClientResult<RegisterStartResponse>;
    async fn register_finish(&self, req: &RegisterFinishRequest) -> ClientResult<StatusResponse>;
    async fn login_start(&self, req: &LoginStartRequest) -> ClientResult<LoginStartResponse>;
    async fn login_finish(&self, req: &LoginFinishRequest) -> ClientResult<LoginFinishResponse>;
    async fn get_user_record(&self, user_id: i64) -> ClientResult<UserRecordResponse>;
    async fn reset_start(&self, req: &ResetStartRequest) -> ClientResult<RegisterStartResponse>;
    async fn reset_finish(&self, req: &ResetFinishRequest) -> ClientResult<StatusResponse>;
}

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// HTTP implementation of [`AuthApi`].
///
/// Holds the current access token for bearer injection on protected
/// endpoints. A 401 on a protected endpoint fires the registered
/// on-unauthorized hook exactly like an expiry would.
pub struct HttpAuthApi {
    client: Client,
    config: ClientConfig,
    access_token: Arc<RwLock<Option<String>>>,
    on_unauthorized: Arc<RwLock<Option<UnauthorizedHook>>>,
}

impl HttpAuthApi {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            access_token: Arc::new(RwLock::new(None)),
            on_unauthorized: Arc::new(RwLock::new(None)),
        })
    }

    /// Sets the bearer token used for protected endpoints.
    pub async fn set_access_token(&self, token: String) {
        *self.access_token.write().await = Some(token);
    }

    /// Drops the bearer token (logout/expiry).
    pub async fn clear_access_token(&self) {
        *self.access_token.write().await = None;
    }

    /// Registers the callback invoked when a protected endpoint answers
    /// 401. The session manager points this at its teardown.
    pub async fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_unauthorized.write().await = Some(Box::new(hook));
    }

    async fn fire_unauthorized(&self) {
        warn!("unauthorized response from API, signalling session teardown");
        if let Some(hook) = self.on_unauthorized.read().await.as_ref() {
            hook();
        }
    }

    /// POST to a public (pre-auth) endpoint. A 401 here means the server
    /// rejected the ceremony, not that the session lapsed.
    async fn post_public<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.config.api_base_url, path);
        debug!("POST {path}");
        let resp = self.client.post(&url).json(body).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Protocol(
                "server rejected authentication".to_string(),
            ));
        }

        decode_body(resp).await
    }

    /// POST to a protected endpoint with bearer injection.
    async fn post_auth<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> ClientResult<T> {
        let token = self
            .access_token
            .read()
            .await
            .clone()
            .ok_or(ClientError::AuthRequired)?;

        let url = format!("{}{}", self.config.api_base_url, path);
        debug!("POST {path} (authenticated)");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.fire_unauthorized().await;
            return Err(ClientError::AuthRequired);
        }

        decode_body(resp).await
    }

    async fn get_auth<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let token = self
            .access_token
            .read()
            .await
            .clone()
            .ok_or(ClientError::AuthRequired)?;

        let url = format!("{}{}", self.config.api_base_url, path);
        debug!("GET {path}");
        let resp = self.client.get(&url).bearer_auth(&token).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.fire_unauthorized().await;
            return Err(ClientError::AuthRequired);
        }

        decode_body(resp).await
    }
}

/// Maps a non-success status to `Api` and a malformed body to `Decode`
/// (surfaced to the user as "invalid response from server").
async fn decode_body<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
    let resp = resp
        .error_for_status()
        .map_err(|e| ClientError::Api(e.to_string()))?;

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("invalid body: {e}")))
}

impl AuthApi for HttpAuthApi {
    async fn register_start(&self, req: &RegisterStartRequest) -> ClientResult<RegisterStartResponse> {
        self.post_public("/auth/register/start", req).await
    }

    async fn register_finish(&self, req: &RegisterFinishRequest) -> ClientResult<StatusResponse> {
        self.post_public("/auth/register/finish", req).await
    }

    async fn login_start(&self, req: &LoginStartRequest) -> ClientResult<LoginStartResponse> {
        self.post_public("/auth/login/start", req).await
    }

    async fn login_finish(&self, req: &LoginFinishRequest) -> ClientResult<LoginFinishResponse> {
        self.post_public("/auth/login/finish", req).await
    }

    async fn get_user_record(&self, user_id: i64) -> ClientResult<UserRecordResponse> {
        self.get_auth(&format!("/user/account/{user_id}")).await
    }

    async fn reset_start(&self, req: &ResetStartRequest) -> ClientResult<RegisterStartResponse> {
        self.post_auth("/user/reset-master-password/start", req).await
    }

    async fn reset_finish(&self, req: &ResetFinishRequest) -> ClientResult<StatusResponse> {
        self.post_auth("/user/reset-master-password/finish", req).await
    }
}
