use bytes::{Buf, BytesMut};

use crate::error::ProtocolError;

/// Maximum frame payload size: 64 KiB.
pub const MAX_FRAME_SIZE: u32 = 65_536;

/// Frame header size: 2 (code) + 4 (payload length).
pub const FRAME_HEADER_SIZE: usize = 6;

/// Header of a request or response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub code: u16,
    pub payload_len: u32,
}

/// Encode a frame for transmission.
///
/// Wire format (both directions):
/// ```text
/// [code: u16 BE] [payload length: u32 BE] [payload]
/// ```
pub fn encode_frame(code: u16, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > MAX_FRAME_SIZE as usize {
        return Err(ProtocolError::FrameTooLarge(payload.len()));
    }
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&code.to_be_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Attempt to extract one complete frame from a byte buffer.
///
/// Returns `Ok(Some((header, payload)))` if a complete frame is
/// available, `Ok(None)` if more data is needed, or `Err` if the
/// advertised length exceeds [`MAX_FRAME_SIZE`] (checked before any
/// allocation).
///
/// Advances the buffer past the consumed frame.
pub fn try_decode_frame(
    buf: &mut BytesMut,
) -> Result<Option<(FrameHeader, Vec<u8>)>, ProtocolError> {
    if buf.len() < FRAME_HEADER_SIZE {
        return Ok(None);
    }

    let code = u16::from_be_bytes([buf[0], buf[1]]);
    let length = u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]);

    if length > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(length as usize));
    }

    if buf.len() < FRAME_HEADER_SIZE + length as usize {
        return Ok(None);
    }

    buf.advance(FRAME_HEADER_SIZE);
    let payload = buf.split_to(length as usize).to_vec();
    Ok(Some((
        FrameHeader {
            code,
            payload_len: length,
        },
        payload,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_frame() {
        let encoded = encode_frame(2102, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(encoded.len(), FRAME_HEADER_SIZE + 5);

        let mut buf = BytesMut::from(&encoded[..]);
        let (header, payload) = try_decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(header.code, 2102);
        assert_eq!(header.payload_len, 5);
        assert_eq!(payload, vec![1, 2, 3, 4, 5]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_header_needs_more_data() {
        let mut buf = BytesMut::from(&[0x08u8, 0x36][..]);
        assert!(try_decode_frame(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn partial_payload_needs_more_data() {
        let encoded = encode_frame(1101, &[9; 20]).unwrap();
        let mut buf = BytesMut::from(&encoded[..encoded.len() - 1]);
        assert!(try_decode_frame(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&encoded[encoded.len() - 1..]);
        let (header, payload) = try_decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(header.code, 1101);
        assert_eq!(payload, vec![9; 20]);
    }

    #[test]
    fn oversize_length_is_rejected() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&1101u16.to_be_bytes());
        buf.extend_from_slice(&(MAX_FRAME_SIZE + 1).to_be_bytes());
        buf.extend_from_slice(&[0u8; 32]);
        let result = try_decode_frame(&mut buf);
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge(_))));
    }

    #[test]
    fn oversize_payload_is_rejected_on_encode() {
        let payload = vec![0u8; MAX_FRAME_SIZE as usize + 1];
        assert!(matches!(
            encode_frame(1103, &payload),
            Err(ProtocolError::FrameTooLarge(_))
        ));
    }

    #[test]
    fn multiple_frames_decode_in_order() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame(1, &[0xAA]).unwrap());
        buf.extend_from_slice(&encode_frame(2, &[0xBB, 0xCC]).unwrap());

        let (h1, p1) = try_decode_frame(&mut buf).unwrap().unwrap();
        let (h2, p2) = try_decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!((h1.code, p1), (1, vec![0xAA]));
        assert_eq!((h2.code, p2), (2, vec![0xBB, 0xCC]));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_payload_frame() {
        let encoded = encode_frame(2103, &[]).unwrap();
        let mut buf = BytesMut::from(&encoded[..]);
        let (header, payload) = try_decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(header.code, 2103);
        assert!(payload.is_empty());
    }
}
