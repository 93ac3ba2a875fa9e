//! Authentication and session core for the Vigil client.
//!
//! The user's master password never leaves the device: authentication runs
//! over a PAKE (password-authenticated key exchange) ceremony against the
//! server, and vault material is decrypted locally with keys from
//! `vigil-crypto`.
//!
//! Layers, bottom up:
//! - [`pake`] — adapter around the external PAKE primitive, translating
//!   between raw bytes and the URL-safe base64 wire encoding
//! - [`api`] — the REST boundary (`AuthApi` trait + reqwest implementation
//!   with bearer injection)
//! - [`token`] — access-token expiry decoding
//! - [`session`] — the session lifecycle state machine: expiry timers,
//!   re-authentication prompting, and guaranteed key zeroization on
//!   teardown
//! - [`auth`] — the registration / login / reset orchestrators tying the
//!   layers together

pub mod api;
pub mod auth;
pub mod config;
mod error;
pub mod pake;
pub mod session;
pub mod token;
pub mod types;

pub use auth::{AuthFlow, LoginSuccess};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{SessionManager, SessionNotice, SessionPhase};
