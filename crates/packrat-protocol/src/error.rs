use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("username too long: {got} bytes (max {max})")]
    NameTooLong { got: usize, max: usize },

    #[error("response too short: {got} bytes, need more than {min}")]
    ResponseTooShort { got: usize, min: usize },

    #[error("unexpected response code: got {got}, expected {expected}")]
    UnexpectedCode { got: u16, expected: u16 },

    #[error("unknown response code: 0x{0:04x}")]
    UnknownCode(u16),

    #[error("frame too large: {0} bytes (max 65536)")]
    FrameTooLarge(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
