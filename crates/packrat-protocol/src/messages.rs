use tracing::warn;

use crate::error::ProtocolError;
use crate::types::{ClientId, CLIENT_ID_SIZE, MAX_NAME_SIZE, PUBKEY_PAYLOAD_SIZE, RSA_KEY_SIZE};

/// Request opcodes sent from client to server.
///
/// Numeric values are fixed by the server deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RequestCode {
    /// Deliver the client's public RSA key; the server answers with an
    /// RSA-encrypted AES session key.
    SendPublicKey = 1101,
    /// Upload a backup payload encrypted under the session key.
    SendEncryptedData = 1103,
}

impl RequestCode {
    pub fn from_u16(code: u16) -> Result<Self, ProtocolError> {
        match code {
            1101 => Ok(Self::SendPublicKey),
            1103 => Ok(Self::SendEncryptedData),
            other => Err(ProtocolError::UnknownCode(other)),
        }
    }
}

/// Response opcodes sent from server to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ResponseCode {
    /// Public key accepted; payload carries the client id followed by the
    /// RSA-encrypted AES session key.
    PubkeyAesSent = 2102,
    /// Encrypted backup payload stored.
    DataReceived = 2103,
    /// Generic server-side failure.
    ServerError = 2999,
}

impl ResponseCode {
    pub fn from_u16(code: u16) -> Result<Self, ProtocolError> {
        match code {
            2102 => Ok(Self::PubkeyAesSent),
            2103 => Ok(Self::DataReceived),
            2999 => Ok(Self::ServerError),
            other => Err(ProtocolError::UnknownCode(other)),
        }
    }
}

/// Build the fixed-width payload of a `SendPublicKey` request.
///
/// Wire format (always exactly [`PUBKEY_PAYLOAD_SIZE`] = 415 bytes):
/// ```text
/// [username: 255 bytes, NUL-padded] [public key DER: 160 bytes, zero-padded or truncated]
/// ```
///
/// A public key longer than the field is cut down to fit — the server
/// only ever reads the first 160 bytes, so this is tolerated (with a
/// warning) rather than rejected.
pub fn build_public_key_payload(
    username: &str,
    public_key: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    if username.len() >= MAX_NAME_SIZE {
        return Err(ProtocolError::NameTooLong {
            got: username.len(),
            max: MAX_NAME_SIZE,
        });
    }

    let mut buf = vec![0u8; PUBKEY_PAYLOAD_SIZE];
    buf[..username.len()].copy_from_slice(username.as_bytes());

    let key_field = &mut buf[MAX_NAME_SIZE..];
    if public_key.len() > RSA_KEY_SIZE {
        warn!(
            "public key is {} bytes, truncating to {}",
            public_key.len(),
            RSA_KEY_SIZE
        );
        key_field.copy_from_slice(&public_key[..RSA_KEY_SIZE]);
    } else {
        key_field[..public_key.len()].copy_from_slice(public_key);
    }

    Ok(buf)
}

/// Parsed payload of a `PubkeyAesSent` response.
///
/// Wire format:
/// ```text
/// [client id: 16 bytes] [RSA ciphertext of the AES session key: remainder]
/// ```
#[derive(Debug, Clone)]
pub struct KeyExchangeResponse {
    pub client_id: ClientId,
    pub encrypted_session_key: Vec<u8>,
}

impl KeyExchangeResponse {
    /// The payload must be strictly longer than the client id prefix, or
    /// there is no ciphertext to decrypt.
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() <= CLIENT_ID_SIZE {
            return Err(ProtocolError::ResponseTooShort {
                got: payload.len(),
                min: CLIENT_ID_SIZE,
            });
        }
        let mut client_id = [0u8; CLIENT_ID_SIZE];
        client_id.copy_from_slice(&payload[..CLIENT_ID_SIZE]);
        Ok(Self {
            client_id,
            encrypted_session_key: payload[CLIENT_ID_SIZE..].to_vec(),
        })
    }
}
