use crate::error::{FrameError, Result};

/// Frame header width: the payload length as ASCII decimal, right-padded
/// with spaces to exactly this many bytes.
pub const HEADER_SIZE: usize = 64;

/// Maximum number of payload bytes moved per transport read or write.
pub const CHUNK_SIZE: usize = 8192;

/// Default maximum payload size: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Build the fixed-width header for a payload of `payload_len` bytes.
///
/// A decimal representation wider than the header is rejected explicitly —
/// the header is never silently truncated.
pub fn encode_header(payload_len: usize) -> Result<[u8; HEADER_SIZE]> {
    let mut header = [b' '; HEADER_SIZE];
    format_length(payload_len, &mut header)?;
    Ok(header)
}

/// Parse a received header back into a payload length.
pub fn parse_header(raw: &[u8; HEADER_SIZE]) -> Result<usize> {
    parse_length(raw)
}

fn format_length(len: usize, dst: &mut [u8]) -> Result<()> {
    let digits = len.to_string();
    if digits.len() > dst.len() {
        return Err(FrameError::HeaderOverflow {
            len,
            width: dst.len(),
        });
    }
    dst[..digits.len()].copy_from_slice(digits.as_bytes());
    Ok(())
}

fn parse_length(raw: &[u8]) -> Result<usize> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| FrameError::MalformedHeader("header is not ASCII".to_string()))?;
    let trimmed = text.trim_end_matches(' ');
    if trimmed.is_empty() {
        return Err(FrameError::MalformedHeader("header is empty".to_string()));
    }
    trimmed
        .parse::<u64>()
        .ok()
        .and_then(|len| usize::try_from(len).ok())
        .ok_or_else(|| {
            FrameError::MalformedHeader(format!("not a non-negative decimal length: {trimmed:?}"))
        })
}

/// Configuration for frame senders and receivers.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Maximum payload size in bytes. Default: 64 MiB.
    pub max_payload_size: usize,
    /// Deadline for each blocking read; expiry surfaces as [`FrameError::Timeout`].
    pub read_timeout: Option<std::time::Duration>,
    /// Deadline for each blocking write; expiry surfaces as [`FrameError::Timeout`].
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
