use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use sockpack_frame::{MessageCipher, KEY_SIZE};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod echo;
pub mod keygen;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a single value.
    Send(SendArgs),
    /// Listen and print received values.
    Listen(ListenArgs),
    /// Start an echo server.
    Echo(EchoArgs),
    /// Generate a random encryption key.
    Keygen(KeygenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Echo(args) => echo::run(args),
        Command::Keygen(args) => keygen::run(args),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to (host:port).
    pub addr: String,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Text payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read a binary payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Wait for one response value and print it.
    #[arg(long)]
    pub wait: bool,
    /// Per-frame deadline (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Hex-encoded 32-byte key file enabling payload encryption.
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind (host:port).
    pub addr: String,
    /// Exit after receiving N values.
    #[arg(long)]
    pub count: Option<usize>,
    /// Hex-encoded 32-byte key file enabling payload encryption.
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind (host:port).
    pub addr: String,
    /// Hex-encoded 32-byte key file enabling payload encryption.
    #[arg(long, value_name = "PATH")]
    pub key_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Write the key here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {}

/// Load an optional cipher from a hex-encoded key file.
pub fn load_cipher(key_file: Option<&PathBuf>) -> CliResult<Option<Arc<MessageCipher>>> {
    let Some(path) = key_file else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| crate::exit::io_error(&format!("failed reading {}", path.display()), err))?;
    let bytes = hex::decode(text.trim())
        .map_err(|err| CliError::new(USAGE, format!("key file is not valid hex: {err}")))?;
    let key: [u8; KEY_SIZE] = bytes.as_slice().try_into().map_err(|_| {
        CliError::new(
            USAGE,
            format!("key must be {KEY_SIZE} bytes, got {}", bytes.len()),
        )
    })?;
    Ok(Some(Arc::new(MessageCipher::new(&key))))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn missing_key_file_is_none() {
        assert!(load_cipher(None).unwrap().is_none());
    }

    #[test]
    fn key_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("sockpack-key-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("key.hex");

        let (key, _) = MessageCipher::generate();
        std::fs::write(&path, format!("{}\n", hex::encode(key))).unwrap();

        let cipher = load_cipher(Some(&path)).unwrap();
        assert!(cipher.is_some());

        std::fs::write(&path, "not-hex").unwrap();
        assert!(load_cipher(Some(&path)).is_err());

        std::fs::write(&path, "aabb").unwrap();
        let err = load_cipher(Some(&path)).unwrap_err();
        assert_eq!(err.code, USAGE);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
