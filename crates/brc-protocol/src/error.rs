use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("incomplete request (no command)")]
    NoCommand,

    #[error("unknown request: 0x{0:02X}")]
    UnknownCommand(u8),

    #[error("uid line exceeds {max} bytes")]
    UidTooLong { max: usize },

    #[error("invalid blob length: {0}")]
    InvalidLength(i32),

    #[error("blob too large: {size} bytes (max {max})")]
    BlobTooLarge { size: usize, max: usize },

    #[error("incomplete blob: expected {expected} bytes, received {received}")]
    IncompleteBlob { expected: usize, received: usize },

    #[error("truncated length field")]
    TruncatedLength,

    #[error("unexpected trailing data after response")]
    TrailingData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
