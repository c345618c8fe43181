//! Blocking TCP transport speaking the protocol frame layout.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::BytesMut;
use tracing::debug;

use packrat_protocol::codec::{encode_frame, try_decode_frame, FrameHeader};
use packrat_protocol::messages::RequestCode;
use packrat_protocol::transport::Transport;
use packrat_protocol::ProtocolError;

pub struct TcpTransport {
    stream: TcpStream,
    read_buf: BytesMut,
}

impl TcpTransport {
    /// Connect to the backup server.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, ProtocolError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            read_buf: BytesMut::with_capacity(4096),
        })
    }
}

impl Transport for TcpTransport {
    fn send_request(&mut self, code: RequestCode, payload: &[u8]) -> Result<(), ProtocolError> {
        let frame = encode_frame(code as u16, payload)?;
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        debug!("sent {:?} ({} payload bytes)", code, payload.len());
        Ok(())
    }

    fn receive_response(&mut self) -> Result<(FrameHeader, Vec<u8>), ProtocolError> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some((header, payload)) = try_decode_frame(&mut self.read_buf)? {
                debug!(
                    "received response code {} ({} payload bytes)",
                    header.code, header.payload_len
                );
                return Ok((header, payload));
            }
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(ProtocolError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-response",
                )));
            }
            self.read_buf.extend_from_slice(&chunk[..n]);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use packrat_protocol::codec::FRAME_HEADER_SIZE;
    use packrat_protocol::messages::ResponseCode;
    use packrat_protocol::types::PUBKEY_PAYLOAD_SIZE;

    use super::*;

    /// One-shot server: read a full request frame, reply with a canned one.
    fn spawn_server(reply_code: u16, reply_payload: Vec<u8>) -> (std::net::SocketAddr, thread::JoinHandle<(u16, Vec<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            let mut header = [0u8; FRAME_HEADER_SIZE];
            stream.read_exact(&mut header).unwrap();
            let code = u16::from_be_bytes([header[0], header[1]]);
            let len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
            let mut payload = vec![0u8; len];
            stream.read_exact(&mut payload).unwrap();

            let reply = encode_frame(reply_code, &reply_payload).unwrap();
            stream.write_all(&reply).unwrap();

            (code, payload)
        });
        (addr, handle)
    }

    #[test]
    fn request_response_roundtrip() {
        let (addr, server) = spawn_server(
            ResponseCode::PubkeyAesSent as u16,
            vec![0xAB; 24],
        );

        let mut transport = TcpTransport::connect(addr).unwrap();
        let request = vec![0x5C; PUBKEY_PAYLOAD_SIZE];
        transport
            .send_request(RequestCode::SendPublicKey, &request)
            .unwrap();
        let (header, payload) = transport.receive_response().unwrap();

        assert_eq!(header.code, ResponseCode::PubkeyAesSent as u16);
        assert_eq!(payload, vec![0xAB; 24]);

        let (seen_code, seen_payload) = server.join().unwrap();
        assert_eq!(seen_code, RequestCode::SendPublicKey as u16);
        assert_eq!(seen_payload, request);
    }

    #[test]
    fn closed_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            // Accept and hang up without replying.
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let mut transport = TcpTransport::connect(addr).unwrap();
        let result = transport.receive_response();
        assert!(matches!(result, Err(ProtocolError::Io(_))));
        server.join().unwrap();
    }
}
