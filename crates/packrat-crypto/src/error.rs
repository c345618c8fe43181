use std::path::PathBuf;

use thiserror::Error;

use packrat_protocol::types::AES_KEY_SIZE;
use packrat_protocol::ProtocolError;

/// Failures while loading or saving the persisted RSA key.
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("no usable key material in {dir}")]
    NotFound { dir: PathBuf },

    #[error("enrollment file is malformed: {reason}")]
    MalformedEnrollment { reason: String },

    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("stored key could not be decoded: {0}")]
    KeyDecode(#[from] rsa::pkcs8::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures in the RSA/AES primitive layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    #[error("public key export failed: {0}")]
    PublicKeyExport(#[source] rsa::pkcs1::Error),

    #[error("RSA decryption rejected the ciphertext")]
    Decrypt,

    #[error("session key has invalid length: {got} bytes (expected {expected})", expected = AES_KEY_SIZE)]
    InvalidKeyLength { got: usize },

    #[error("key store failure: {0}")]
    Store(#[from] KeyStoreError),
}

/// Failures while establishing the session key with the server.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The transport could not complete the round trip.
    #[error("transport round trip failed: {0}")]
    Transport(#[source] ProtocolError),

    /// The round trip completed but the response violated the protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
