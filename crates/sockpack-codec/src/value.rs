use bytes::Bytes;

/// A typed unit of application data.
///
/// The variant set is closed: these eight are the only shapes that cross the
/// wire. Containers hold `Value` recursively; map keys are restricted to the
/// primitive variants (enforced at encode time).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Float32(f32),
    Text(String),
    Bytes(Bytes),
    /// Fixed-arity ordered sequence.
    Tuple(Vec<Value>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Ordered key/value pairs. Iteration order is the encoding order.
    Map(Vec<(Value, Value)>),
}

/// Tag bytes identifying each variant on the wire. The set is fixed; an
/// unrecognized tag is a decode error, never a forward-compatibility path.
pub mod tag {
    pub const BOOL: u8 = 0x00;
    pub const INT32: u8 = 0x01;
    pub const FLOAT32: u8 = 0x02;
    pub const TEXT: u8 = 0x03;
    pub const BYTES: u8 = 0x04;
    pub const TUPLE: u8 = 0x05;
    pub const LIST: u8 = 0x06;
    pub const MAP: u8 = 0x07;
}

impl Value {
    /// The wire tag for this variant.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Bool(_) => tag::BOOL,
            Value::Int32(_) => tag::INT32,
            Value::Float32(_) => tag::FLOAT32,
            Value::Text(_) => tag::TEXT,
            Value::Bytes(_) => tag::BYTES,
            Value::Tuple(_) => tag::TUPLE,
            Value::List(_) => tag::LIST,
            Value::Map(_) => tag::MAP,
        }
    }

    /// Variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Float32(_) => "float32",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether this value may appear as a map key (primitives only).
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Int32(_)
                | Value::Float32(_)
                | Value::Text(_)
                | Value::Bytes(_)
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_wire_assignment() {
        assert_eq!(Value::Bool(true).tag(), 0x00);
        assert_eq!(Value::Int32(0).tag(), 0x01);
        assert_eq!(Value::Float32(0.0).tag(), 0x02);
        assert_eq!(Value::Text(String::new()).tag(), 0x03);
        assert_eq!(Value::Bytes(Bytes::new()).tag(), 0x04);
        assert_eq!(Value::Tuple(vec![]).tag(), 0x05);
        assert_eq!(Value::List(vec![]).tag(), 0x06);
        assert_eq!(Value::Map(vec![]).tag(), 0x07);
    }

    #[test]
    fn primitives_are_map_key_eligible() {
        assert!(Value::from(1).is_primitive());
        assert!(Value::from("k").is_primitive());
        assert!(!Value::List(vec![]).is_primitive());
        assert!(!Value::Map(vec![]).is_primitive());
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(-7), Value::Int32(-7));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
        assert_eq!(
            Value::from(vec![1u8, 2, 3]),
            Value::Bytes(Bytes::from_static(&[1, 2, 3]))
        );
    }
}
