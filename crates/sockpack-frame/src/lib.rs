//! Length-headed, chunked message framing for structured values.
//!
//! This is the transport half of sockpack. Every message is one frame:
//! - A 64-byte header carrying the payload length as space-padded ASCII decimal
//! - The payload: a `sockpack-codec` encoding, optionally sealed with
//!   ChaCha20-Poly1305
//!
//! Payloads move across the stream in chunks of at most 8192 bytes. Partial
//! reads and writes are handled internally — callers always get a complete
//! value or a typed error, never a partially received message.

pub mod cipher;
pub mod error;
pub mod frame;
pub mod reader;
pub mod writer;

pub use cipher::{MessageCipher, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use error::{FrameError, Result};
pub use frame::{encode_header, parse_header, ChannelConfig, CHUNK_SIZE, DEFAULT_MAX_PAYLOAD, HEADER_SIZE};
pub use reader::MessageReceiver;
pub use writer::MessageSender;
