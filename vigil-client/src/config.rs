//! Client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the auth client and session lifecycle.
///
/// The session timing values are client policy, not protocol constants:
/// the server enforces its own token expiry regardless.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the Vigil API (e.g., "https://api.vigipastore.app").
    pub api_base_url: String,

    /// Server identity bound into the PAKE ceremony. Must match the
    /// server's configuration exactly.
    pub server_identity: String,

    /// App version, mixed into the login context string for domain
    /// separation across releases.
    pub app_version: String,

    /// Re-authentication prompt threshold: when time-to-expiry drops below
    /// this, the user is asked to re-enter the password (seconds).
    pub reauth_threshold_secs: i64,

    /// Safety buffer subtracted from the token deadline so the client
    /// always tears down slightly before the server would reject it
    /// (seconds).
    pub expiry_buffer_secs: i64,

    /// Interval for the UI countdown refresh (seconds). Display only; the
    /// actual teardown is a single deadline-based timer.
    pub countdown_refresh_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.vigipastore.app".to_string(),
            server_identity: "VigiPastore".to_string(),
            app_version: "1.0.0".to_string(),
            reauth_threshold_secs: 120,
            expiry_buffer_secs: 5,
            countdown_refresh_secs: 30,
        }
    }
}

impl ClientConfig {
    /// The domain-separation context for the login ceremony. Must match
    /// what the server used or the PAKE finish step fails.
    pub fn login_context(&self) -> String {
        format!("{}-{}", self.server_identity, self.app_version)
    }

    /// Creates a config with short timers for tests.
    pub fn test() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            reauth_threshold_secs: 5,
            expiry_buffer_secs: 1,
            countdown_refresh_secs: 1,
            ..Self::default()
        }
    }
}
