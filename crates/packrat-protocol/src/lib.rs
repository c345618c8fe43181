//! Packrat wire protocol — the byte layouts shared with the backup server.
//!
//! Everything the server is bit-exact about lives here:
//! - protocol size constants and the client identity record
//! - request/response opcodes
//! - fixed-width payloads (NUL-padded username, padded/truncated key field)
//! - the length-prefixed frame layout
//! - the blocking transport seam the key-exchange core drives

pub mod codec;
pub mod error;
pub mod messages;
pub mod transport;
pub mod types;

// Re-export key types for convenience
pub use error::ProtocolError;
pub use messages::{build_public_key_payload, KeyExchangeResponse, RequestCode, ResponseCode};
pub use transport::Transport;
pub use types::{
    ClientId, Identity, AES_KEY_SIZE, CLIENT_ID_SIZE, MAX_NAME_SIZE, PUBKEY_PAYLOAD_SIZE,
    RSA_KEY_SIZE,
};
