use clap::ValueEnum;
use serde::Serialize;
use sockpack_codec::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ValueOutput {
    connection: u64,
    value: serde_json::Value,
}

/// Print one received value to stdout.
pub fn print_value(value: &Value, connection_id: u64, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("conn={connection_id} {}", render(value));
        }
        OutputFormat::Json => {
            let out = ValueOutput {
                connection: connection_id,
                value: value_to_json(value),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }
}

fn render(value: &Value) -> String {
    value_to_json(value).to_string()
}

/// Lossy JSON rendering for display. Bytes become hex strings; non-text map
/// keys become arrays of pairs.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int32(i) => serde_json::Value::from(*i),
        Value::Float32(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(format!("0x{}", hex::encode(b))),
        Value::Tuple(items) | Value::List(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(pairs) => {
            if pairs.iter().all(|(k, _)| matches!(k, Value::Text(_))) {
                let object = pairs
                    .iter()
                    .map(|(k, v)| {
                        let key = match k {
                            Value::Text(s) => s.clone(),
                            _ => unreachable!(),
                        };
                        (key, value_to_json(v))
                    })
                    .collect();
                serde_json::Value::Object(object)
            } else {
                serde_json::Value::Array(
                    pairs
                        .iter()
                        .map(|(k, v)| {
                            serde_json::Value::Array(vec![value_to_json(k), value_to_json(v)])
                        })
                        .collect(),
                )
            }
        }
    }
}

/// Build a sockpack value from parsed JSON input.
///
/// Integers in i32 range become `Int32`, other numbers `Float32`; objects
/// become maps with text keys. JSON null has no counterpart and is rejected.
pub fn json_to_value(json: &serde_json::Value) -> Result<Value, String> {
    match json {
        serde_json::Value::Null => Err("null has no sockpack representation".to_string()),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if let Ok(i) = i32::try_from(i) {
                    return Ok(Value::Int32(i));
                }
            }
            n.as_f64()
                .map(|f| Value::Float32(f as f32))
                .ok_or_else(|| format!("number {n} is not representable"))
        }
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Array(items) => Ok(Value::List(
            items.iter().map(json_to_value).collect::<Result<_, _>>()?,
        )),
        serde_json::Value::Object(fields) => Ok(Value::Map(
            fields
                .iter()
                .map(|(k, v)| Ok((Value::Text(k.clone()), json_to_value(v)?)))
                .collect::<Result<_, String>>()?,
        )),
    }
}
