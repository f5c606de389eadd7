use std::net::ToSocketAddrs;
use std::sync::Arc;

use sockpack_frame::{ChannelConfig, MessageCipher};

use crate::connection::Connection;
use crate::error::Result;
use crate::tcp::TcpTransport;

/// Connect to a sockpack server with default configuration and no cipher.
pub fn connect<A: ToSocketAddrs + ToString>(addr: A) -> Result<Connection> {
    connect_with_config(addr, ChannelConfig::default(), None)
}

/// Connect with explicit frame configuration and optional cipher.
///
/// The cipher must match the server's key, or every exchanged frame fails
/// with `DecryptionFailed` on the receiving side.
pub fn connect_with_config<A: ToSocketAddrs + ToString>(
    addr: A,
    config: ChannelConfig,
    cipher: Option<Arc<MessageCipher>>,
) -> Result<Connection> {
    let stream = TcpTransport::connect(addr)?;
    Connection::from_stream(0, stream, config, cipher)
}

#[cfg(test)]
mod tests {
    use sockpack_codec::Value;
    use sockpack_frame::FrameError;

    use super::*;
    use crate::error::NetError;

    #[test]
    fn client_observes_server_side_close() {
        let transport = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = transport.local_addr();

        let server = std::thread::spawn(move || {
            let (stream, _peer) = transport.accept().unwrap();
            drop(stream);
        });

        let mut client = connect(addr).unwrap();
        server.join().unwrap();

        let err = client.receive().unwrap_err();
        assert!(matches!(
            err,
            NetError::Frame(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn read_deadline_surfaces_as_timeout() {
        let transport = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = transport.local_addr();

        let server = std::thread::spawn(move || {
            let (stream, _peer) = transport.accept().unwrap();
            // Hold the connection open but never write.
            std::thread::sleep(std::time::Duration::from_millis(200));
            drop(stream);
        });

        let config = ChannelConfig {
            read_timeout: Some(std::time::Duration::from_millis(30)),
            ..ChannelConfig::default()
        };
        let mut client = connect_with_config(addr, config, None).unwrap();
        let err = client.receive().unwrap_err();
        assert!(matches!(err, NetError::Frame(FrameError::Timeout)));

        server.join().unwrap();
        let _ = client.send(&Value::Bool(true));
    }
}
