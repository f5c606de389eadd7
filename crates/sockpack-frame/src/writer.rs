use std::borrow::Cow;
use std::io::{ErrorKind, Write};
use std::sync::Arc;

use sockpack_codec::{encode, Value};
use tracing::trace;

use crate::cipher::MessageCipher;
use crate::error::{FrameError, Result};
use crate::frame::{encode_header, ChannelConfig, CHUNK_SIZE};

/// Sends values as complete frames over any `Write` stream.
///
/// One frame per value: header first, then the payload in chunks of at most
/// [`CHUNK_SIZE`] bytes, each chunk fully written before the next. Completion
/// means "handed to the transport", not "received by the peer".
pub struct MessageSender<T> {
    inner: T,
    cipher: Option<Arc<MessageCipher>>,
    config: ChannelConfig,
}

impl<T: Write> MessageSender<T> {
    /// Create a sender with default configuration and no encryption.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ChannelConfig::default())
    }

    /// Create a sender with explicit configuration.
    pub fn with_config(inner: T, config: ChannelConfig) -> Self {
        Self {
            inner,
            cipher: None,
            config,
        }
    }

    /// Seal every outgoing payload with the shared cipher.
    pub fn with_cipher(mut self, cipher: Arc<MessageCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Encode, optionally seal, and send one value (blocking).
    pub fn send(&mut self, value: &Value) -> Result<()> {
        let encoded = encode(value)?;
        let payload: Cow<'_, [u8]> = match &self.cipher {
            Some(cipher) => Cow::Owned(cipher.encrypt(&encoded)?),
            None => Cow::Borrowed(&encoded),
        };

        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        let header = encode_header(payload.len())?;
        self.write_all(&header)?;
        for chunk in payload.chunks(CHUNK_SIZE) {
            self.write_all(chunk)?;
        }
        trace!(payload_len = payload.len(), "frame sent");
        self.flush()
    }

    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.inner.write(buf) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => buf = &buf[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.map_write_error(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.map_write_error(err)),
            }
        }
    }

    fn map_write_error(&self, err: std::io::Error) -> FrameError {
        if self.config.write_timeout.is_some()
            && matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
        {
            FrameError::Timeout
        } else {
            FrameError::Io(err)
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

    /// Consume the sender and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current sender configuration.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }
}
