//! Array, serializable (struct) and enumeration codecs.
//!
//! These are parameterized over other codecs and are what the dictionary
//! binder constructs for every user-defined type.

use error::Error;
use stream::ByteStream;
use types::codec::Codec;
use types::value::Value;

use std::collections::HashMap;
use std::rc::Rc;

/// A fixed-size homogeneous array.
#[derive(Debug)]
pub struct ArrayCodec {
    element: Rc<dyn Codec>,
    size: usize,
}

impl ArrayCodec {
    pub fn new(element: Rc<dyn Codec>, size: usize) -> Self {
        ArrayCodec { element, size }
    }
}

impl Codec for ArrayCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let mut elements = Vec::with_capacity(self.size);
        for _ in 0..self.size {
            elements.push(self.element.decode(stream, None)?);
        }
        Ok(Value::Array(elements))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::Array(ref elements) if elements.len() == self.size => {
                for element in elements {
                    self.element.encode(element, out)?;
                }
                Ok(())
            }
            ref other => Err(Error::Encode(format!(
                "expected an array of {} elements, got {:?}",
                self.size, other
            ))),
        }
    }

    fn width(&self) -> Option<usize> {
        self.element.width().map(|w| w * self.size)
    }
}

/// An ordered sequence of named members, each with its own codec.
///
/// Members appear on the wire in declared order.
#[derive(Debug)]
pub struct SerializableCodec {
    members: Vec<(String, Rc<dyn Codec>)>,
}

impl SerializableCodec {
    pub fn new(members: Vec<(String, Rc<dyn Codec>)>) -> Self {
        SerializableCodec { members }
    }
}

impl Codec for SerializableCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let mut decoded = Vec::with_capacity(self.members.len());
        for &(ref name, ref codec) in &self.members {
            decoded.push((name.clone(), codec.decode(stream, None)?));
        }
        Ok(Value::Struct(decoded))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        let members = match *value {
            Value::Struct(ref members) => members,
            ref other => {
                return Err(Error::Encode(format!("expected a struct, got {:?}", other)));
            }
        };
        for &(ref name, ref codec) in &self.members {
            let member = members
                .iter()
                .find(|&&(ref n, _)| n == name)
                .map(|&(_, ref value)| value)
                .ok_or_else(|| Error::Encode(format!("missing struct member \"{}\"", name)))?;
            codec.encode(member, out)?;
        }
        Ok(())
    }

    fn width(&self) -> Option<usize> {
        let mut total = 0;
        for &(_, ref codec) in &self.members {
            total += codec.width()?;
        }
        Some(total)
    }
}

/// An enumeration backed by a fundamental underlying codec.
///
/// Decoding maps the wire integer to the declared member name; values with
/// no declared member come back with the raw integer preserved instead of
/// failing, so framing can continue.
#[derive(Debug)]
pub struct EnumCodec {
    underlying: Rc<dyn Codec>,
    names: HashMap<i64, String>,
}

impl EnumCodec {
    pub fn new<I>(underlying: Rc<dyn Codec>, items: I) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        EnumCodec {
            underlying,
            names: items.into_iter().map(|(name, value)| (value, name)).collect(),
        }
    }
}

impl Codec for EnumCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let raw = self.underlying.decode(stream, None)?;
        let value = raw
            .as_i64()
            .ok_or_else(|| Error::MalformedPacket(format!("enum value {:?} is not an integer", raw)))?;
        Ok(Value::Enum {
            name: self.names.get(&value).cloned(),
            value,
        })
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::Enum { value, .. } => self.underlying.encode(&Value::I64(value), out),
            ref other => Err(Error::Encode(format!("expected an enum, got {:?}", other))),
        }
    }

    fn width(&self) -> Option<usize> {
        self.underlying.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream::SliceStream;
    use types::fundamental::{Endian, FundamentalCodec, Kind};

    fn u8_codec() -> Rc<dyn Codec> {
        Rc::new(FundamentalCodec::new(Kind::U8, Endian::Big))
    }

    #[test]
    fn array_round_trip() {
        let codec = ArrayCodec::new(u8_codec(), 3);
        let value = Value::Array(vec![Value::U8(1), Value::U8(2), Value::U8(3)]);
        let mut out = Vec::new();
        codec.encode(&value, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        let decoded = codec.decode(&mut SliceStream::new(&out), None).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn array_encode_checks_size() {
        let codec = ArrayCodec::new(u8_codec(), 3);
        let short = Value::Array(vec![Value::U8(1)]);
        assert!(codec.encode(&short, &mut Vec::new()).is_err());
    }

    #[test]
    fn serializable_member_order() {
        let codec = SerializableCodec::new(vec![
            ("first".to_string(), u8_codec()),
            (
                "second".to_string(),
                Rc::new(FundamentalCodec::new(Kind::U16, Endian::Big)) as Rc<dyn Codec>,
            ),
        ]);
        let decoded = codec
            .decode(&mut SliceStream::new(&[0x07, 0x01, 0x02]), None)
            .unwrap();
        assert_eq!(
            decoded,
            Value::Struct(vec![
                ("first".to_string(), Value::U8(7)),
                ("second".to_string(), Value::U16(258)),
            ])
        );

        let mut out = Vec::new();
        codec.encode(&decoded, &mut out).unwrap();
        assert_eq!(out, [0x07, 0x01, 0x02]);
    }

    #[test]
    fn enum_maps_names() {
        let underlying = Rc::new(FundamentalCodec::new(Kind::I32, Endian::Big)) as Rc<dyn Codec>;
        let codec = EnumCodec::new(
            underlying,
            vec![("IDLE".to_string(), 0), ("RUN".to_string(), 1)],
        );
        let decoded = codec
            .decode(&mut SliceStream::new(&[0, 0, 0, 1]), None)
            .unwrap();
        assert_eq!(
            decoded,
            Value::Enum {
                name: Some("RUN".to_string()),
                value: 1,
            }
        );
    }

    #[test]
    fn enum_preserves_unknown_values() {
        let underlying = Rc::new(FundamentalCodec::new(Kind::I32, Endian::Big)) as Rc<dyn Codec>;
        let codec = EnumCodec::new(underlying, vec![("IDLE".to_string(), 0)]);
        let decoded = codec
            .decode(&mut SliceStream::new(&[0, 0, 0, 9]), None)
            .unwrap();
        assert_eq!(decoded, Value::Enum { name: None, value: 9 });

        // The raw integer round trips even without a declared member.
        let mut out = Vec::new();
        codec.encode(&decoded, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 9]);
    }
}
