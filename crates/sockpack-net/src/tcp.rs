use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{NetError, Result};

/// TCP transport: bind/accept/connect over a reliable byte stream.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on a TCP address (blocking).
    pub fn bind<A: ToSocketAddrs + ToString>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(&addr).map_err(|e| NetError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr()?;
        let transport = Self {
            listener,
            local_addr,
        };
        info!(%local_addr, transport = transport.transport_name(), "listening");
        Ok(transport)
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        let (stream, peer_addr) = self.listener.accept().map_err(NetError::Accept)?;
        debug!(%peer_addr, transport = self.transport_name(), "accepted connection");
        Ok((stream, peer_addr))
    }

    /// Connect to a listening TCP address (blocking).
    pub fn connect<A: ToSocketAddrs + ToString>(addr: A) -> Result<TcpStream> {
        let stream = TcpStream::connect(&addr).map_err(|e| NetError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(addr = %addr.to_string(), "connected to tcp socket");
        Ok(stream)
    }

    /// The address this transport is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
