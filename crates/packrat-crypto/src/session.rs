//! The single round trip that establishes the shared AES session key.
//!
//! The client sends its public RSA key in a fixed-width payload; the
//! server answers with the client's assigned identifier and the AES
//! session key encrypted under that public key.

use tracing::{debug, info};

use packrat_protocol::messages::{
    build_public_key_payload, KeyExchangeResponse, RequestCode, ResponseCode,
};
use packrat_protocol::transport::Transport;
use packrat_protocol::types::Identity;
use packrat_protocol::ProtocolError;

use crate::bulk::SessionKey;
use crate::error::ExchangeError;
use crate::identity::IdentityKeyManager;

/// Send the public-key payload and validate the server's response frame.
///
/// The response must carry the `PubkeyAesSent` code and a payload longer
/// than the client-id prefix; anything else aborts the exchange.
pub fn send_and_receive<T: Transport>(
    transport: &mut T,
    payload: &[u8],
) -> Result<KeyExchangeResponse, ExchangeError> {
    transport
        .send_request(RequestCode::SendPublicKey, payload)
        .map_err(ExchangeError::Transport)?;
    let (header, body) = transport
        .receive_response()
        .map_err(ExchangeError::Transport)?;

    if header.code != ResponseCode::PubkeyAesSent as u16 {
        return Err(ProtocolError::UnexpectedCode {
            got: header.code,
            expected: ResponseCode::PubkeyAesSent as u16,
        }
        .into());
    }

    Ok(KeyExchangeResponse::parse(&body)?)
}

/// Run the full key exchange: build the payload, perform the round trip,
/// record the server-assigned client id, decrypt the session key.
///
/// Every failure aborts the whole exchange with the originating error;
/// no partial state survives. A caller that wants a retry re-runs
/// `establish` from scratch.
pub fn establish<T: Transport>(
    transport: &mut T,
    keys: &IdentityKeyManager,
    identity: &mut Identity,
) -> Result<SessionKey, ExchangeError> {
    let public_key = keys.public_key_der()?;
    let payload = build_public_key_payload(&identity.username, &public_key)?;
    debug!(
        "sending public key for {} ({} bytes DER)",
        identity.username,
        public_key.len()
    );

    let response = send_and_receive(transport, &payload)?;
    identity.client_id = Some(response.client_id);

    let session_key = keys.decrypt_session_key(&response.encrypted_session_key)?;
    info!("session key established for {}", identity.username);
    Ok(session_key)
}
