//! PAKE client adapter.
//!
//! The actual password-authenticated key exchange math lives in an external
//! primitive behind the [`PakeSuite`] trait; this module owns loading it
//! (once, task-safe) and translating between the raw bytes the primitive
//! speaks and the URL-safe base64 strings that cross the wire. Everything
//! above this module works in encoded strings; everything below it in
//! bytes.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;
use vigil_crypto::{from_url_safe_base64, to_url_safe_base64};

/// Identity binding for a PAKE ceremony: client identity is the account
/// email, server identity is a fixed configured string.
#[derive(Clone, Debug)]
pub struct PakeIdentities {
    pub client: String,
    pub server: String,
}

/// A blinded first-round message plus the opaque client state needed to
/// finish the ceremony. The state is single-use: if the round fails, it is
/// discarded, never retried.
pub struct PakeRequest {
    pub message: Vec<u8>,
    pub state: Vec<u8>,
}

/// Output of the registration finish step.
pub struct PakeRegistration {
    pub record: Vec<u8>,
    pub export_key: Vec<u8>,
}

/// Output of the login finish step.
pub struct PakeCredentials {
    pub session_key: Vec<u8>,
    pub finish_message: Vec<u8>,
    pub export_key: Vec<u8>,
}

/// The external PAKE primitive. Implementations perform the actual
/// cryptography; this crate only sequences the ceremony.
///
/// Failures mean the peer data was malformed or the password/identity/
/// context binding did not hold — implementations must not distinguish
/// those cases in their error text.
pub trait PakeSuite: Send + Sync {
    fn create_registration_request(&self, password: &str) -> ClientResult<PakeRequest>;

    fn finalize_registration(
        &self,
        state: &[u8],
        response: &[u8],
        ids: &PakeIdentities,
    ) -> ClientResult<PakeRegistration>;

    fn create_credential_request(&self, password: &str) -> ClientResult<PakeRequest>;

    fn recover_credentials(
        &self,
        password: &str,
        state: &[u8],
        response: &[u8],
        context: &str,
        ids: &PakeIdentities,
    ) -> ClientResult<PakeCredentials>;
}

type SuiteHandle = Arc<dyn PakeSuite>;
type LoaderFuture = Pin<Box<dyn Future<Output = ClientResult<SuiteHandle>> + Send>>;

/// First-round result handed to the API layer, already wire-encoded.
#[derive(Clone, Debug)]
pub struct StartFlow {
    pub request: String,
    pub client_state: String,
}

/// Registration finish result, wire-encoded.
#[derive(Clone, Debug)]
pub struct FinishRegistration {
    pub registration_record: String,
    pub export_key: String,
}

/// Login finish result, wire-encoded.
#[derive(Clone, Debug)]
pub struct FinishLogin {
    pub session_key: String,
    pub finish_request: String,
    pub export_key: String,
}

/// Handle to the loaded PAKE primitive.
///
/// The loader runs at most once per client, on first use, and concurrent
/// first uses wait for the same initialization. A failed load leaves the
/// cell empty, so the next call retries.
pub struct PakeClient {
    suite: OnceCell<SuiteHandle>,
    loader: Box<dyn Fn() -> LoaderFuture + Send + Sync>,
    server_identity: String,
    login_context: String,
}

impl PakeClient {
    pub fn new<L, F>(config: &ClientConfig, loader: L) -> Self
    where
        L: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = ClientResult<SuiteHandle>> + Send + 'static,
    {
        Self {
            suite: OnceCell::new(),
            loader: Box::new(move || Box::pin(loader())),
            server_identity: config.server_identity.clone(),
            login_context: config.login_context(),
        }
    }

    async fn suite(&self) -> ClientResult<&SuiteHandle> {
        self.suite
            .get_or_try_init(|| (self.loader)())
            .await
            .map_err(|e| match e {
                ClientError::CryptoInit(_) => e,
                other => ClientError::CryptoInit(other.to_string()),
            })
    }

    fn identities(&self, email: &str) -> PakeIdentities {
        PakeIdentities {
            client: email.to_string(),
            server: self.server_identity.clone(),
        }
    }

    /// Produces the blinded registration request and client state.
    pub async fn start_registration(&self, password: &str) -> ClientResult<StartFlow> {
        let request = self.suite().await?.create_registration_request(password)?;
        Ok(StartFlow {
            request: to_url_safe_base64(&request.message),
            client_state: to_url_safe_base64(&request.state),
        })
    }

    /// Finalizes registration against the server's response, binding the
    /// client identity (email) and configured server identity.
    pub async fn finish_registration(
        &self,
        email: &str,
        client_state: &str,
        server_response: &str,
    ) -> ClientResult<FinishRegistration> {
        let state = decode_pake_field(client_state)?;
        let response = decode_pake_field(server_response)?;

        let result =
            self.suite()
                .await?
                .finalize_registration(&state, &response, &self.identities(email))?;

        Ok(FinishRegistration {
            registration_record: to_url_safe_base64(&result.record),
            export_key: to_url_safe_base64(&result.export_key),
        })
    }

    /// Produces the blinded login request and client state.
    pub async fn start_login(&self, password: &str) -> ClientResult<StartFlow> {
        let request = self.suite().await?.create_credential_request(password)?;
        Ok(StartFlow {
            request: to_url_safe_base64(&request.message),
            client_state: to_url_safe_base64(&request.state),
        })
    }

    /// Recovers credentials from the server's login response.
    ///
    /// The context string (`server_identity "-" app_version`) must match
    /// what the server used. A mismatch, a wrong password, and a tampered
    /// response all surface as the same [`ClientError::Protocol`].
    pub async fn finish_login(
        &self,
        email: &str,
        password: &str,
        client_state: &str,
        server_response: &str,
    ) -> ClientResult<FinishLogin> {
        let state = decode_pake_field(client_state)?;
        let response = decode_pake_field(server_response)?;

        let result = self.suite().await?.recover_credentials(
            password,
            &state,
            &response,
            &self.login_context,
            &self.identities(email),
        )?;

        Ok(FinishLogin {
            session_key: to_url_safe_base64(&result.session_key),
            finish_request: to_url_safe_base64(&result.finish_message),
            export_key: to_url_safe_base64(&result.export_key),
        })
    }
}

/// PAKE wire fields are opaque: a field that fails to decode is
/// indistinguishable from one the primitive would reject.
fn decode_pake_field(s: &str) -> ClientResult<Vec<u8>> {
    from_url_safe_base64(s).map_err(|_| ClientError::Protocol("malformed ceremony data".to_string()))
}
