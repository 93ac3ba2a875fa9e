//! Encryption layer for the Vigil client.
//!
//! Provides the zero-knowledge vault primitives:
//! - Argon2id for master-key derivation from the user's password
//! - XChaCha20-Poly1305 for authenticated encryption
//! - Secure key management with zeroization
//!
//! # Architecture
//!
//! The encryption uses a two-tier key system:
//!
//! 1. **Master Key**: Derived from the user's password and a stored salt
//!    using Argon2id. The key is never stored or transmitted — it is derived
//!    each time it is needed and wiped immediately afterwards. Only the salt
//!    leaves the device.
//!
//! 2. **Vault Key**: A random key generated once at registration. It
//!    encrypts every vault record and is persisted only in wrapped
//!    (master-key-encrypted) form, bound to the account email.
//!
//! This architecture allows:
//! - Changing the master password without re-encrypting any records
//!   (only the vault-key envelope is re-wrapped)
//! - The server storing the envelope and records without being able to
//!   decrypt either

mod cipher;
mod codec;
mod envelope;
mod error;
mod key;
mod record;

pub use cipher::{decrypt_with_aad, encrypt_with_aad, EncryptedData, NONCE_SIZE, TAG_SIZE};
pub use codec::{
    from_base64, from_url_safe_base64, to_base64, to_url_safe_base64, utf8_to_string,
};
pub use envelope::{seal_vault_key, unwrap_vault_key, wrap_vault_key, VaultKeyEnvelope};
pub use error::{CryptoError, CryptoResult};
pub use key::{derive_key, DerivedKey, KdfParams, MasterKey, Salt, VaultKey, KEY_SIZE, SALT_SIZE};
pub use record::{decrypt_record, encrypt_record, VaultRecord};
