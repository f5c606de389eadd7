/// Errors that can occur in the client/server layer.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on a connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame-level error (framing, codec, or cipher).
    #[error("frame error: {0}")]
    Frame(#[from] sockpack_frame::FrameError),

    /// The server has been shut down.
    #[error("server shut down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, NetError>;
