use sockpack_codec::{DecodeError, EncodeError};

/// Errors that can occur while sending or receiving frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload length's decimal form does not fit in the header width.
    #[error("payload length {len} does not fit in a {width}-byte header")]
    HeaderOverflow { len: usize, width: usize },

    /// The received header is not a space-padded decimal length.
    #[error("malformed frame header: {0}")]
    MalformedHeader(String),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The connection was closed before a complete frame was transferred.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A configured read/write deadline expired mid-frame.
    #[error("frame deadline expired")]
    Timeout,

    /// Sealing the payload failed.
    #[error("payload encryption failed")]
    EncryptionFailed,

    /// The payload failed authentication (wrong key or corrupted data).
    #[error("payload decryption failed")]
    DecryptionFailed,

    /// An I/O error occurred on the underlying stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
