use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, EncodeError};
use crate::value::{tag, Value};

/// Encode a value into its canonical byte form.
///
/// Wire format, per variant:
/// ```text
/// ┌──────────┬──────────────────────────────────────────────┐
/// │ Tag (1B) │ Payload                                      │
/// ├──────────┼──────────────────────────────────────────────┤
/// │ 0x00     │ bool: 1 byte (0x00 / 0x01)                   │
/// │ 0x01     │ int32: 4 bytes LE two's complement           │
/// │ 0x02     │ float32: 4 bytes IEEE-754 single, LE         │
/// │ 0x03     │ text: u32 LE byte length + UTF-8 bytes       │
/// │ 0x04     │ bytes: u32 LE length + raw bytes             │
/// │ 0x05-06  │ tuple/list: u32 LE count + child encodings   │
/// │ 0x07     │ map: u32 LE pair count + key/value encodings │
/// └──────────┴──────────────────────────────────────────────┘
/// ```
/// Both 4-byte numeric payloads are little-endian on the wire.
pub fn encode(value: &Value) -> Result<Bytes, EncodeError> {
    let mut buf = BytesMut::with_capacity(encoded_len(value));
    encode_into(value, &mut buf)?;
    Ok(buf.freeze())
}

/// Encode a value, appending to an existing buffer.
pub fn encode_into(value: &Value, dst: &mut BytesMut) -> Result<(), EncodeError> {
    dst.put_u8(value.tag());
    match value {
        Value::Bool(b) => dst.put_u8(u8::from(*b)),
        Value::Int32(i) => dst.put_i32_le(*i),
        Value::Float32(f) => dst.put_f32_le(*f),
        Value::Text(s) => {
            put_len(s.len(), dst)?;
            dst.put_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            put_len(b.len(), dst)?;
            dst.put_slice(b);
        }
        Value::Tuple(items) | Value::List(items) => {
            put_len(items.len(), dst)?;
            for item in items {
                encode_into(item, dst)?;
            }
        }
        Value::Map(pairs) => {
            put_len(pairs.len(), dst)?;
            for (key, val) in pairs {
                if !key.is_primitive() {
                    return Err(EncodeError::UnsupportedType { kind: key.kind() });
                }
                encode_into(key, dst)?;
                encode_into(val, dst)?;
            }
        }
    }
    Ok(())
}

/// The exact encoded length of a value, without encoding it.
///
/// Encoding is deterministic, so the length is always known before writing.
pub fn encoded_len(value: &Value) -> usize {
    1 + match value {
        Value::Bool(_) => 1,
        Value::Int32(_) | Value::Float32(_) => 4,
        Value::Text(s) => 4 + s.len(),
        Value::Bytes(b) => 4 + b.len(),
        Value::Tuple(items) | Value::List(items) => {
            4 + items.iter().map(encoded_len).sum::<usize>()
        }
        Value::Map(pairs) => {
            4 + pairs
                .iter()
                .map(|(k, v)| encoded_len(k) + encoded_len(v))
                .sum::<usize>()
        }
    }
}

/// Decode one value from the front of `buf`.
///
/// Returns the value and the exact number of bytes consumed, so callers can
/// scan concatenated encodings. Trailing bytes are not an error here.
pub fn decode(buf: &[u8]) -> Result<(Value, usize), DecodeError> {
    let mut cursor = Cursor { buf, pos: 0 };
    let value = cursor.value()?;
    Ok((value, cursor.pos))
}

fn put_len(len: usize, dst: &mut BytesMut) -> Result<(), EncodeError> {
    let len = u32::try_from(len).map_err(|_| EncodeError::Overflow { len })?;
    dst.put_u32_le(len);
    Ok(())
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn value(&mut self) -> Result<Value, DecodeError> {
        let tag_byte = self.take_u8()?;
        match tag_byte {
            tag::BOOL => {
                let offset = self.pos;
                match self.take_u8()? {
                    0x00 => Ok(Value::Bool(false)),
                    0x01 => Ok(Value::Bool(true)),
                    other => Err(DecodeError::InvalidEncoding {
                        offset,
                        reason: format!("bool payload must be 0x00 or 0x01, got 0x{other:02X}"),
                    }),
                }
            }
            tag::INT32 => Ok(Value::Int32(i32::from_le_bytes(self.take_array()?))),
            tag::FLOAT32 => Ok(Value::Float32(f32::from_le_bytes(self.take_array()?))),
            tag::TEXT => {
                let len = self.take_len()?;
                let offset = self.pos;
                let raw = self.take_slice(len)?;
                let text = std::str::from_utf8(raw).map_err(|err| {
                    DecodeError::InvalidEncoding {
                        offset,
                        reason: format!("text payload is not valid UTF-8: {err}"),
                    }
                })?;
                Ok(Value::Text(text.to_string()))
            }
            tag::BYTES => {
                let len = self.take_len()?;
                let raw = self.take_slice(len)?;
                Ok(Value::Bytes(Bytes::copy_from_slice(raw)))
            }
            tag::TUPLE | tag::LIST => {
                let count = self.take_len()?;
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.value()?);
                }
                Ok(if tag_byte == tag::TUPLE {
                    Value::Tuple(items)
                } else {
                    Value::List(items)
                })
            }
            tag::MAP => {
                let count = self.take_len()?;
                let mut pairs = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    let key = self.value()?;
                    let val = self.value()?;
                    pairs.push((key, val));
                }
                Ok(Value::Map(pairs))
            }
            other => Err(DecodeError::UnknownTag(other)),
        }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }

    fn take_len(&mut self) -> Result<usize, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?) as usize)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.take_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) {
        let wire = encode(&value).unwrap();
        assert_eq!(wire.len(), encoded_len(&value));
        let (decoded, consumed) = decode(&wire).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn roundtrip_primitives() {
        roundtrip(Value::Bool(true));
        roundtrip(Value::Bool(false));
        roundtrip(Value::Int32(0));
        roundtrip(Value::Int32(i32::MIN));
        roundtrip(Value::Int32(i32::MAX));
        roundtrip(Value::Float32(0.0));
        roundtrip(Value::Float32(-1.5e30));
        roundtrip(Value::Text(String::new()));
        roundtrip(Value::Text("héllo wörld".to_string()));
        roundtrip(Value::Bytes(Bytes::from_static(b"\x00\xFF\x7F")));
    }

    #[test]
    fn roundtrip_containers() {
        roundtrip(Value::Tuple(vec![]));
        roundtrip(Value::List(vec![]));
        roundtrip(Value::Map(vec![]));
        roundtrip(Value::Tuple(vec![
            Value::Int32(1),
            Value::Text("two".to_string()),
            Value::Bool(false),
        ]));
        roundtrip(Value::List(vec![
            Value::List(vec![Value::Int32(1)]),
            Value::List(vec![]),
        ]));
        roundtrip(Value::Map(vec![
            (Value::Text("a".to_string()), Value::Int32(1)),
            (
                Value::Int32(2),
                Value::Map(vec![(Value::Bool(true), Value::Float32(0.5))]),
            ),
        ]));
    }

    #[test]
    fn roundtrip_deep_nesting() {
        let mut value = Value::Int32(42);
        for _ in 0..64 {
            value = Value::List(vec![value]);
        }
        roundtrip(value);
    }

    #[test]
    fn wire_bytes_are_canonical() {
        assert_eq!(
            encode(&Value::Bool(true)).unwrap().as_ref(),
            &[0x00, 0x01]
        );
        assert_eq!(
            encode(&Value::Int32(1)).unwrap().as_ref(),
            &[0x01, 0x01, 0x00, 0x00, 0x00]
        );
        // -2 little-endian two's complement
        assert_eq!(
            encode(&Value::Int32(-2)).unwrap().as_ref(),
            &[0x01, 0xFE, 0xFF, 0xFF, 0xFF]
        );
        // 1.0f32 = 0x3F800000, little-endian
        assert_eq!(
            encode(&Value::Float32(1.0)).unwrap().as_ref(),
            &[0x02, 0x00, 0x00, 0x80, 0x3F]
        );
        assert_eq!(
            encode(&Value::Text("abc".to_string())).unwrap().as_ref(),
            &[0x03, 0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c']
        );
        assert_eq!(
            encode(&Value::List(vec![Value::Bool(false)]))
                .unwrap()
                .as_ref(),
            &[0x06, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn text_length_counts_bytes_not_code_points() {
        let wire = encode(&Value::Text("é".to_string())).unwrap();
        // "é" is 2 UTF-8 bytes
        assert_eq!(&wire[1..5], &[0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn duplicate_values_encode_twice() {
        let shared = Value::Text("dup".to_string());
        let value = Value::List(vec![shared.clone(), shared.clone()]);
        let wire = encode(&value).unwrap();
        assert_eq!(wire.len(), 1 + 4 + 2 * encoded_len(&shared));
    }

    #[test]
    fn unknown_tag_rejected() {
        for tag_byte in 0x08..=0xFFu8 {
            let err = decode(&[tag_byte]).unwrap_err();
            assert!(matches!(err, DecodeError::UnknownTag(t) if t == tag_byte));
        }
    }

    #[test]
    fn every_strict_prefix_is_truncated() {
        let value = Value::Map(vec![
            (
                Value::Text("key".to_string()),
                Value::Tuple(vec![Value::Int32(7), Value::Float32(1.25)]),
            ),
            (Value::Bytes(Bytes::from_static(b"xyz")), Value::Bool(true)),
        ]);
        let wire = encode(&value).unwrap();
        for cut in 0..wire.len() {
            let err = decode(&wire[..cut]).unwrap_err();
            assert!(
                matches!(err, DecodeError::Truncated { .. }),
                "prefix of {cut} bytes should be truncated, got {err:?}"
            );
        }
    }

    #[test]
    fn truncated_reports_offset_and_need() {
        // Int32 tag with only two payload bytes.
        let err = decode(&[0x01, 0xAA, 0xBB]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated { offset: 1, needed: 2 }
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let wire = [0x03, 0x02, 0x00, 0x00, 0x00, 0xC0, 0x80];
        let err = decode(&wire).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEncoding { .. }));
    }

    #[test]
    fn invalid_bool_byte_rejected() {
        let err = decode(&[0x00, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEncoding { .. }));
    }

    #[test]
    fn container_map_key_rejected_on_encode() {
        let value = Value::Map(vec![(Value::List(vec![]), Value::Int32(1))]);
        let err = encode(&value).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnsupportedType { kind: "list" }
        ));
    }

    #[test]
    fn oversized_declared_count_is_truncated_not_oom() {
        // List claiming u32::MAX elements with an empty body must fail fast
        // without attempting a matching allocation.
        let wire = [0x06, 0xFF, 0xFF, 0xFF, 0xFF];
        let err = decode(&wire).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn concatenated_values_scan_by_consumed() {
        let first = Value::Int32(1);
        let second = Value::Text("after".to_string());
        let mut wire = BytesMut::new();
        encode_into(&first, &mut wire).unwrap();
        encode_into(&second, &mut wire).unwrap();

        let (v1, used) = decode(&wire).unwrap();
        assert_eq!(v1, first);
        let (v2, rest) = decode(&wire[used..]).unwrap();
        assert_eq!(v2, second);
        assert_eq!(used + rest, wire.len());
    }
}
