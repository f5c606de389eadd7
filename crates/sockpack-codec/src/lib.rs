//! Self-describing binary encoding for a small closed set of value types.
//!
//! Every encoded value starts with one tag byte identifying its variant,
//! followed by a fixed 4-byte payload or a `u32` little-endian length prefix.
//! Containers encode recursively. The format carries no references, no
//! cycles, and no user-defined types — it is a safe interchange format,
//! not an object graph serializer.
//!
//! `decode(encode(v))` returns `v` together with the exact number of bytes
//! consumed, for every representable value.

pub mod codec;
pub mod error;
pub mod value;

pub use codec::{decode, encode, encode_into, encoded_len};
pub use error::{DecodeError, EncodeError};
pub use value::Value;
