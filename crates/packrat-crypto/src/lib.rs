//! Packrat cryptographic layer — identity keys, key exchange, bulk encryption.
//!
//! This crate provides:
//! - RSA identity key generation and two-tier persistence
//!   (binary DER cache with an enrollment-file fallback)
//! - The public-key exchange round trip that establishes the AES session key
//! - AES-256-CBC encryption of backup payloads under that key

pub mod bulk;
pub mod error;
pub mod identity;
pub mod keystore;
pub mod session;

// Re-export key types for convenience
pub use bulk::SessionKey;
pub use error::{CryptoError, ExchangeError, KeyStoreError};
pub use identity::IdentityKeyManager;
pub use keystore::KeyStore;
pub use session::{establish, send_and_receive};
