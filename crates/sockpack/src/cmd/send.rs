use sockpack_codec::Value;
use sockpack_frame::ChannelConfig;
use sockpack_net::connect_with_config;

use crate::cmd::{load_cipher, parse_duration, SendArgs};
use crate::exit::{net_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{json_to_value, print_value, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let cipher = load_cipher(args.key_file.as_ref())?;
    let config = ChannelConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..ChannelConfig::default()
    };

    let value = resolve_payload(&args)?;
    let mut connection = connect_with_config(args.addr.as_str(), config, cipher)
        .map_err(|err| net_error("connect failed", err))?;

    connection
        .send(&value)
        .map_err(|err| net_error("send failed", err))?;

    if args.wait {
        let response = connection
            .receive()
            .map_err(|err| net_error("receive failed", err))?;
        print_value(&response, connection.id(), format);
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Value> {
    if let Some(json) = &args.json {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return json_to_value(&parsed).map_err(|err| CliError::new(USAGE, err));
    }
    if let Some(data) = &args.data {
        return Ok(Value::Text(data.clone()));
    }
    if let Some(path) = &args.file {
        let bytes = std::fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        })?;
        return Ok(Value::Bytes(bytes.into()));
    }
    Err(CliError::new(
        USAGE,
        "one of --json, --data, or --file is required",
    ))
}
