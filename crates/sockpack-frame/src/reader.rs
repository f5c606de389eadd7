use std::borrow::Cow;
use std::io::{ErrorKind, Read};
use std::sync::Arc;

use sockpack_codec::{decode, Value};
use tracing::debug;

use crate::cipher::MessageCipher;
use crate::error::{FrameError, Result};
use crate::frame::{parse_header, ChannelConfig, CHUNK_SIZE, HEADER_SIZE};

/// Receives complete frames from any `Read` stream.
///
/// Accumulates across partial reads — callers always get a whole decoded
/// value. A connection failure at any point aborts the receive; no partial
/// value is ever returned.
pub struct MessageReceiver<T> {
    inner: T,
    cipher: Option<Arc<MessageCipher>>,
    config: ChannelConfig,
}

impl<T: Read> MessageReceiver<T> {
    /// Create a receiver with default configuration and no encryption.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ChannelConfig::default())
    }

    /// Create a receiver with explicit configuration.
    pub fn with_config(inner: T, config: ChannelConfig) -> Self {
        Self {
            inner,
            cipher: None,
            config,
        }
    }

    /// Open every incoming payload with the shared cipher.
    pub fn with_cipher(mut self, cipher: Arc<MessageCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Receive the next value (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` if the peer closes before
    /// a full header and payload have arrived.
    pub fn receive(&mut self) -> Result<Value> {
        let mut header = [0u8; HEADER_SIZE];
        self.read_exact(&mut header)?;

        let declared = parse_header(&header)?;
        if declared > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: declared,
                max: self.config.max_payload_size,
            });
        }

        let mut payload = vec![0u8; declared];
        let mut filled = 0usize;
        while filled < declared {
            let bound = (declared - filled).min(CHUNK_SIZE);
            let read = self.read_some(&mut payload[filled..filled + bound])?;
            filled += read;
        }

        let plain: Cow<'_, [u8]> = match &self.cipher {
            Some(cipher) => Cow::Owned(cipher.decrypt(&payload)?),
            None => Cow::Borrowed(&payload),
        };

        let (value, consumed) = decode(&plain)?;
        if consumed < plain.len() {
            debug!(
                trailing = plain.len() - consumed,
                "frame payload has trailing bytes after decoded value"
            );
        }
        Ok(value)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            let read = self.read_some(&mut buf[filled..])?;
            filled += read;
        }
        Ok(())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if self.config.read_timeout.is_some()
                        && matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Err(FrameError::Timeout)
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the receiver and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current receiver configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}
