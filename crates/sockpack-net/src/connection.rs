use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;

use sockpack_codec::Value;
use sockpack_frame::{ChannelConfig, MessageCipher, MessageReceiver, MessageSender};

use crate::error::Result;

/// One end of an established connection.
///
/// Owned by exactly one worker: `send` and `receive` block that worker until
/// the full frame has moved or the connection fails. The read and write
/// halves are cloned handles of the same socket.
pub struct Connection {
    id: u64,
    peer_addr: SocketAddr,
    sender: MessageSender<TcpStream>,
    receiver: MessageReceiver<TcpStream>,
}

impl Connection {
    pub(crate) fn from_stream(
        id: u64,
        stream: TcpStream,
        config: ChannelConfig,
        cipher: Option<Arc<MessageCipher>>,
    ) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        let write_half = stream.try_clone()?;
        let mut sender = MessageSender::with_config(write_half, config.clone());
        let mut receiver = MessageReceiver::with_config(stream, config);
        if let Some(cipher) = cipher {
            sender = sender.with_cipher(Arc::clone(&cipher));
            receiver = receiver.with_cipher(cipher);
        }

        Ok(Self {
            id,
            peer_addr,
            sender,
            receiver,
        })
    }

    /// Server-assigned connection id (0 for client-side connections).
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Address of the remote peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send one value as a single frame (blocking).
    pub fn send(&mut self, value: &Value) -> Result<()> {
        self.sender.send(value)?;
        Ok(())
    }

    /// Receive the next value (blocking).
    pub fn receive(&mut self) -> Result<Value> {
        Ok(self.receiver.receive()?)
    }

    /// Shut down both directions of the connection.
    ///
    /// Unblocks a worker waiting inside `send`/`receive` on the other half.
    pub fn close(&self) -> Result<()> {
        self.receiver.get_ref().shutdown(Shutdown::Both)?;
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}
