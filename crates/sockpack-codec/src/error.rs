/// Errors that can occur while encoding a value.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A container value was used where only primitives are allowed (map keys).
    #[error("{kind} values cannot be used as map keys")]
    UnsupportedType { kind: &'static str },

    /// A length does not fit in the 4-byte wire representation.
    #[error("length {len} exceeds the u32 wire limit")]
    Overflow { len: usize },
}

/// Errors that can occur while decoding a byte sequence.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The tag byte is outside the defined variant set.
    #[error("unknown tag byte 0x{0:02X}")]
    UnknownTag(u8),

    /// The input ended before the value was complete.
    #[error("truncated input: needed {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// A payload violates the variant's encoding rules (bad UTF-8, bad bool byte).
    #[error("invalid encoding at offset {offset}: {reason}")]
    InvalidEncoding { offset: usize, reason: String },
}
