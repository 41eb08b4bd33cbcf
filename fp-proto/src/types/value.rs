//! The decoded value representation shared by all codecs.

use bytes::Bytes;
use serde_json::Value as Json;

use std::fmt;

/// An F Prime time stamp.
///
/// The base and context fields are only present on the wire when the
/// `USE_TIME_BASE` / `USE_TIME_CONTEXT` configuration flags are set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    pub base: Option<u64>,
    pub context: Option<u64>,
    pub seconds: u32,
    pub microseconds: u32,
}

impl Time {
    /// Seconds since the Unix epoch, with sub-second precision.
    pub fn unix_seconds(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.microseconds) * 1e-6
    }

    pub fn to_json(&self) -> Json {
        let mut obj = ::serde_json::Map::new();
        if let Some(base) = self.base {
            obj.insert("base".to_string(), json!(base));
        }
        if let Some(context) = self.context {
            obj.insert("context".to_string(), json!(context));
        }
        obj.insert("seconds".to_string(), json!(self.seconds));
        obj.insert("microseconds".to_string(), json!(self.microseconds));
        obj.insert("value".to_string(), json!(self.unix_seconds()));
        Json::Object(obj)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:06}", self.seconds, self.microseconds)
    }
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Bool(bool),
    /// Opaque bytes: "read the rest" payloads and explicit-length buffers.
    Bytes(Bytes),
    /// An ASCII string carrying no length information on the wire.
    Ascii(String),
    /// A length-prefixed ASCII string.
    String(String),
    /// An enumeration constant. `name` is `None` when the wire value is not
    /// a declared member; the raw integer is preserved either way.
    Enum { name: Option<String>, value: i64 },
    Array(Vec<Value>),
    /// Ordered named members of a serializable (struct) type.
    Struct(Vec<(String, Value)>),
    Time(Time),
}

impl Value {
    /// The value as a signed integer, when it is an integer.
    ///
    /// Unsigned 64-bit values are reinterpreted bit-for-bit.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(i64::from(v)),
            Value::U8(v) => Some(i64::from(v)),
            Value::I16(v) => Some(i64::from(v)),
            Value::U16(v) => Some(i64::from(v)),
            Value::I32(v) => Some(i64::from(v)),
            Value::U32(v) => Some(i64::from(v)),
            Value::I64(v) => Some(v),
            Value::U64(v) => Some(v as i64),
            _ => None,
        }
    }

    /// The value as an unsigned integer, when it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(u64::from(v)),
            Value::U16(v) => Some(u64::from(v)),
            Value::U32(v) => Some(u64::from(v)),
            Value::U64(v) => Some(v),
            Value::I8(_) | Value::I16(_) | Value::I32(_) | Value::I64(_) => {
                self.as_i64().and_then(|v| if v >= 0 { Some(v as u64) } else { None })
            }
            _ => None,
        }
    }

    /// The value as a float, when it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(f64::from(v)),
            Value::F64(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Renders the value the way the JSON printer expects it.
    pub fn to_json(&self) -> Json {
        match *self {
            Value::I8(v) => json!(v),
            Value::U8(v) => json!(v),
            Value::I16(v) => json!(v),
            Value::U16(v) => json!(v),
            Value::I32(v) => json!(v),
            Value::U32(v) => json!(v),
            Value::I64(v) => json!(v),
            Value::U64(v) => json!(v),
            Value::F32(v) => json!(v),
            Value::F64(v) => json!(v),
            Value::Bool(v) => json!(v),
            Value::Bytes(ref b) => json!(hex_prefixed(b)),
            Value::Ascii(ref s) => json!(s),
            Value::String(ref s) => json!({ "length": s.len(), "string": s }),
            Value::Enum { ref name, value } => match *name {
                Some(ref name) => json!(name),
                None => json!(value),
            },
            Value::Array(ref elements) => {
                Json::Array(elements.iter().map(Value::to_json).collect())
            }
            Value::Struct(ref members) => {
                let mut obj = ::serde_json::Map::new();
                for &(ref name, ref value) in members {
                    obj.insert(name.clone(), value.to_json());
                }
                Json::Object(obj)
            }
            Value::Time(ref time) => time.to_json(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::I8(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Bytes(ref b) => write!(f, "{}", hex_prefixed(b)),
            Value::Ascii(ref s) | Value::String(ref s) => f.write_str(s),
            Value::Enum { ref name, value } => match *name {
                Some(ref name) => f.write_str(name),
                None => write!(f, "{}", value),
            },
            Value::Time(ref time) => write!(f, "{}", time),
            Value::Array(_) | Value::Struct(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Lower-case hex rendering of a byte slice.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Lower-case hex rendering with a `0x` prefix.
pub fn hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_display() {
        let time = Time {
            base: Some(2),
            context: Some(0),
            seconds: 1234,
            microseconds: 56,
        };
        assert_eq!(time.to_string(), "1234.000056");
        assert!((time.unix_seconds() - 1234.000056).abs() < 1e-9);
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(hex(&[0xde, 0xad]), "dead");
        assert_eq!(hex_prefixed(&[]), "0x");
    }

    #[test]
    fn enum_json_prefers_name() {
        let known = Value::Enum {
            name: Some("RUN".to_string()),
            value: 1,
        };
        assert_eq!(known.to_json(), json!("RUN"));
        let unknown = Value::Enum { name: None, value: 7 };
        assert_eq!(unknown.to_json(), json!(7));
    }
}
