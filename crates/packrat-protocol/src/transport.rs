//! Transport seam between the key-exchange core and the connection layer.

use crate::codec::FrameHeader;
use crate::error::ProtocolError;
use crate::messages::RequestCode;

/// Blocking request/response transport the key-exchange core drives.
///
/// One `send_request` / `receive_response` pair per protocol round trip;
/// the caller is suspended until the response arrives. Implementations
/// own framing and delivery — the core only sees opcodes and payloads.
pub trait Transport {
    fn send_request(&mut self, code: RequestCode, payload: &[u8]) -> Result<(), ProtocolError>;

    fn receive_response(&mut self) -> Result<(FrameHeader, Vec<u8>), ProtocolError>;
}
