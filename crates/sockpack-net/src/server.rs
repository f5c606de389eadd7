use std::collections::HashMap;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sockpack_frame::{ChannelConfig, MessageCipher};
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{NetError, Result};
use crate::tcp::TcpTransport;

/// Shared map of active connection handles, keyed by connection id.
///
/// The accept loop registers a cloned socket handle for every connection it
/// spawns a worker for; shutdown walks the roster and closes each handle,
/// which unblocks any worker stuck in a frame read or write.
#[derive(Default)]
struct Roster {
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl Roster {
    fn register(&self, id: u64, stream: TcpStream) {
        if let Ok(mut streams) = self.streams.lock() {
            streams.insert(id, stream);
        }
    }

    fn deregister(&self, id: u64) {
        if let Ok(mut streams) = self.streams.lock() {
            streams.remove(&id);
        }
    }

    fn len(&self) -> usize {
        self.streams.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn close_all(&self) {
        if let Ok(mut streams) = self.streams.lock() {
            for (id, stream) in streams.drain() {
                debug!(id, "closing connection for shutdown");
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

/// TCP server: accept loop spawning one worker thread per connection.
///
/// The handler owns a connection end-to-end. A frame error on one connection
/// terminates only that connection's worker; the server and every other
/// connection keep running.
pub struct Server {
    transport: TcpTransport,
    config: ChannelConfig,
    cipher: Option<Arc<MessageCipher>>,
    roster: Arc<Roster>,
    running: Arc<AtomicBool>,
    next_conn_id: AtomicU64,
}

impl Server {
    /// Bind to a TCP address.
    pub fn bind<A: ToSocketAddrs + ToString>(addr: A) -> Result<Self> {
        let transport = TcpTransport::bind(addr)?;
        Ok(Self {
            transport,
            config: ChannelConfig::default(),
            cipher: None,
            roster: Arc::new(Roster::default()),
            running: Arc::new(AtomicBool::new(true)),
            next_conn_id: AtomicU64::new(1),
        })
    }

    /// Seal/open every payload with the shared cipher.
    pub fn with_cipher(mut self, cipher: Arc<MessageCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Override frame channel configuration for accepted connections.
    pub fn with_channel_config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// A cloneable handle for observing and shutting down the server.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            running: Arc::clone(&self.running),
            roster: Arc::clone(&self.roster),
            local_addr: self.transport.local_addr(),
        }
    }

    /// Run the accept loop until shutdown (blocking).
    ///
    /// Each accepted connection gets its own worker thread running `handler`.
    /// The handler's error return marks the connection as failed; it is
    /// logged and the worker exits without affecting the server.
    pub fn run<H>(&self, handler: H) -> Result<()>
    where
        H: Fn(Connection) -> Result<()> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);

        while self.running.load(Ordering::SeqCst) {
            let (stream, peer_addr) = match self.transport.accept() {
                Ok(accepted) => accepted,
                Err(_) if !self.running.load(Ordering::SeqCst) => break,
                Err(err) => return Err(err),
            };
            if !self.running.load(Ordering::SeqCst) {
                // Shutdown wake-up dial; drop it and stop accepting.
                break;
            }

            let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
            let roster_handle = match stream.try_clone() {
                Ok(handle) => handle,
                Err(err) => {
                    warn!(%peer_addr, error = %err, "dropping connection: clone failed");
                    continue;
                }
            };
            self.roster.register(id, roster_handle);

            let connection =
                match Connection::from_stream(id, stream, self.config.clone(), self.cipher.clone())
                {
                    Ok(connection) => connection,
                    Err(err) => {
                        warn!(id, %peer_addr, error = %err, "dropping connection: setup failed");
                        self.roster.deregister(id);
                        continue;
                    }
                };

            let handler = Arc::clone(&handler);
            let roster = Arc::clone(&self.roster);
            std::thread::Builder::new()
                .name(format!("sockpack-conn-{id}"))
                .spawn(move || {
                    debug!(id, %peer_addr, "connection worker started");
                    if let Err(err) = handler(connection) {
                        warn!(id, %peer_addr, error = %err, "connection terminated with error");
                    }
                    roster.deregister(id);
                    debug!(id, "connection worker finished");
                })?;
        }

        Ok(())
    }
}

/// Observes and stops a running [`Server`] from another thread.
#[derive(Clone)]
pub struct ServerHandle {
    running: Arc<AtomicBool>,
    roster: Arc<Roster>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    /// Whether the accept loop is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of currently active connections.
    pub fn active_connections(&self) -> usize {
        self.roster.len()
    }

    /// Stop the server: close every active connection and unblock the
    /// accept loop.
    ///
    /// Cancellation is cooperative; workers blocked inside a frame read or
    /// write are unblocked by the socket close and observe
    /// `ConnectionClosed`. Idempotent.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("shutting down server");
            self.roster.close_all();
            // Wake the blocked accept with a throwaway dial.
            let _ = TcpStream::connect(self.local_addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sockpack_codec::Value;
    use sockpack_frame::FrameError;

    use super::*;
    use crate::client::{connect, connect_with_config};

    fn echo_until_closed(mut connection: Connection) -> Result<()> {
        loop {
            match connection.receive() {
                Ok(value) => connection.send(&value)?,
                Err(NetError::Frame(FrameError::ConnectionClosed)) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    fn spawn_echo_server(
        cipher: Option<Arc<MessageCipher>>,
    ) -> (SocketAddr, ServerHandle, std::thread::JoinHandle<Result<()>>) {
        let mut server = Server::bind("127.0.0.1:0").unwrap();
        if let Some(cipher) = cipher {
            server = server.with_cipher(cipher);
        }
        let addr = server.local_addr();
        let handle = server.handle();
        let join = std::thread::spawn(move || server.run(echo_until_closed));
        (addr, handle, join)
    }

    #[test]
    fn end_to_end_echo() {
        let (addr, handle, join) = spawn_echo_server(None);

        let mut client = connect(addr).unwrap();
        for value in [
            Value::Int32(-3),
            Value::List(vec![]),
            Value::Map(vec![(Value::Text("k".to_string()), Value::Bool(true))]),
        ] {
            client.send(&value).unwrap();
            assert_eq!(client.receive().unwrap(), value);
        }

        drop(client);
        handle.shutdown();
        join.join().unwrap().unwrap();
    }

    #[test]
    fn concurrent_clients_are_isolated() {
        let (addr, handle, join) = spawn_echo_server(None);

        let clients: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let mut client = connect(addr).unwrap();
                    for round in 0..20 {
                        let value = Value::Tuple(vec![
                            Value::Int32(i),
                            Value::Int32(round),
                        ]);
                        client.send(&value).unwrap();
                        assert_eq!(client.receive().unwrap(), value);
                    }
                })
            })
            .collect();

        for client in clients {
            client.join().unwrap();
        }

        handle.shutdown();
        join.join().unwrap().unwrap();
    }

    #[test]
    fn encrypted_end_to_end() {
        let (key, _) = MessageCipher::generate();
        let server_cipher = Arc::new(MessageCipher::new(&key));
        let (addr, handle, join) = spawn_echo_server(Some(server_cipher));

        let client_cipher = Arc::new(MessageCipher::new(&key));
        let mut client =
            connect_with_config(addr, ChannelConfig::default(), Some(client_cipher)).unwrap();

        let value = Value::Text("sealed both ways".to_string());
        client.send(&value).unwrap();
        assert_eq!(client.receive().unwrap(), value);

        drop(client);
        handle.shutdown();
        join.join().unwrap().unwrap();
    }

    #[test]
    fn failed_connection_does_not_stop_server() {
        let (key, _) = MessageCipher::generate();
        let (addr, handle, join) = spawn_echo_server(Some(Arc::new(MessageCipher::new(&key))));

        // Client without a cipher: its first frame fails decryption, that
        // worker terminates, the server keeps accepting.
        {
            let mut bad_client = connect(addr).unwrap();
            bad_client.send(&Value::Int32(1)).unwrap();
            // The server closes nothing client-side; just drop.
            let _ = bad_client.close();
        }

        let mut good_client = connect_with_config(
            addr,
            ChannelConfig::default(),
            Some(Arc::new(MessageCipher::new(&key))),
        )
        .unwrap();
        let value = Value::Int32(2);
        good_client.send(&value).unwrap();
        assert_eq!(good_client.receive().unwrap(), value);

        drop(good_client);
        handle.shutdown();
        join.join().unwrap().unwrap();
    }

    #[test]
    fn shutdown_unblocks_blocked_workers() {
        let (addr, handle, join) = spawn_echo_server(None);

        // A client that connects and then sends nothing: the server worker
        // blocks inside receive().
        let client = connect(addr).unwrap();
        while handle.active_connections() == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }

        handle.shutdown();
        join.join().unwrap().unwrap();
        assert!(!handle.is_running());

        // Worker observed the close and deregistered.
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while handle.active_connections() > 0 {
            assert!(std::time::Instant::now() < deadline, "roster never drained");
            std::thread::sleep(Duration::from_millis(5));
        }
        drop(client);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (_, handle, join) = spawn_echo_server(None);
        handle.shutdown();
        handle.shutdown();
        join.join().unwrap().unwrap();
    }
}
