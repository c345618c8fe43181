/// Username field width on the wire. Names are NUL-padded up to this,
/// so the longest usable username is one byte shorter.
pub const MAX_NAME_SIZE: usize = 255;

/// Public-key field width on the wire. DER exports shorter than this are
/// zero-padded; longer ones are truncated.
pub const RSA_KEY_SIZE: usize = 160;

/// AES session key length in bytes.
pub const AES_KEY_SIZE: usize = 32;

/// Width of the server-assigned client identifier. The server hands out
/// UUID-wide identifiers; a deployment with a different width changes
/// this one constant.
pub const CLIENT_ID_SIZE: usize = 16;

/// Total size of the public-key exchange request payload:
/// `[username: 255][public key: 160]` = 415 bytes, never variable.
pub const PUBKEY_PAYLOAD_SIZE: usize = MAX_NAME_SIZE + RSA_KEY_SIZE;

/// Opaque identifier assigned by the server on the first key exchange.
pub type ClientId = [u8; CLIENT_ID_SIZE];

/// The client identity as the server sees it.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Username presented in the key exchange; must be shorter than
    /// [`MAX_NAME_SIZE`] bytes.
    pub username: String,
    /// `None` until the first key exchange succeeds, then immutable for
    /// the rest of the session.
    pub client_id: Option<ClientId>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            client_id: None,
        }
    }
}
