//! TCP client/server layer for sockpack.
//!
//! One dedicated worker thread per accepted connection; the only state
//! shared between workers is the read-only cipher and the connection
//! roster the server keeps for coordinated shutdown. A frame error on one
//! connection terminates that connection's worker and nothing else.

pub mod client;
pub mod connection;
pub mod error;
pub mod server;
pub mod tcp;

pub use client::{connect, connect_with_config};
pub use connection::Connection;
pub use error::{NetError, Result};
pub use server::{Server, ServerHandle};
pub use tcp::TcpTransport;
