//! Fixed-width integer, float and boolean codecs.

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian, WriteBytesExt};

use error::Error;
use stream::ByteStream;
use types::codec::Codec;
use types::value::Value;

/// Numeric kind of a fundamental codec.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Kind {
    /// Wire width in bytes.
    pub fn width(self) -> usize {
        match self {
            Kind::I8 | Kind::U8 => 1,
            Kind::I16 | Kind::U16 => 2,
            Kind::I32 | Kind::U32 | Kind::F32 => 4,
            Kind::I64 | Kind::U64 | Kind::F64 => 8,
        }
    }

    fn is_float(self) -> bool {
        match self {
            Kind::F32 | Kind::F64 => true,
            _ => false,
        }
    }
}

/// Byte order of a fundamental codec.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Endian {
    Big,
    Little,
    Native,
}

/// A fixed-width numeric codec.
///
/// The full product of kind and byte order is registered under the names
/// `U16`/`U16BE`/`U16LE`/`U16N` etc.; the bare name family is big-endian,
/// which is what F Prime serializes by default.
#[derive(Debug, Copy, Clone)]
pub struct FundamentalCodec {
    kind: Kind,
    endian: Endian,
}

impl FundamentalCodec {
    pub fn new(kind: Kind, endian: Endian) -> Self {
        FundamentalCodec { kind, endian }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    fn decode_bytes<B: ByteOrder>(&self, buf: &[u8]) -> Value {
        match self.kind {
            Kind::I8 => Value::I8(buf[0] as i8),
            Kind::U8 => Value::U8(buf[0]),
            Kind::I16 => Value::I16(B::read_i16(buf)),
            Kind::U16 => Value::U16(B::read_u16(buf)),
            Kind::I32 => Value::I32(B::read_i32(buf)),
            Kind::U32 => Value::U32(B::read_u32(buf)),
            Kind::I64 => Value::I64(B::read_i64(buf)),
            Kind::U64 => Value::U64(B::read_u64(buf)),
            Kind::F32 => Value::F32(B::read_f32(buf)),
            Kind::F64 => Value::F64(B::read_f64(buf)),
        }
    }

    fn encode_bytes<B: ByteOrder>(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        if self.kind.is_float() {
            let v = value
                .as_f64()
                .ok_or_else(|| Error::Encode(format!("expected a number, got {:?}", value)))?;
            match self.kind {
                Kind::F32 => out.write_f32::<B>(v as f32)?,
                _ => out.write_f64::<B>(v)?,
            }
            return Ok(());
        }

        let v = value
            .as_i64()
            .ok_or_else(|| Error::Encode(format!("expected an integer, got {:?}", value)))?;
        match self.kind {
            Kind::I8 => out.write_i8(v as i8)?,
            Kind::U8 => out.write_u8(v as u8)?,
            Kind::I16 => out.write_i16::<B>(v as i16)?,
            Kind::U16 => out.write_u16::<B>(v as u16)?,
            Kind::I32 => out.write_i32::<B>(v as i32)?,
            Kind::U32 => out.write_u32::<B>(v as u32)?,
            Kind::I64 => out.write_i64::<B>(v)?,
            Kind::U64 => out.write_u64::<B>(v as u64)?,
            Kind::F32 | Kind::F64 => unreachable!(),
        }
        Ok(())
    }
}

impl Codec for FundamentalCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let buf = stream.read_n(self.kind.width())?;
        Ok(match self.endian {
            Endian::Big => self.decode_bytes::<BigEndian>(&buf),
            Endian::Little => self.decode_bytes::<LittleEndian>(&buf),
            Endian::Native => self.decode_bytes::<NativeEndian>(&buf),
        })
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match self.endian {
            Endian::Big => self.encode_bytes::<BigEndian>(value, out),
            Endian::Little => self.encode_bytes::<LittleEndian>(value, out),
            Endian::Native => self.encode_bytes::<NativeEndian>(value, out),
        }
    }

    fn width(&self) -> Option<usize> {
        Some(self.kind.width())
    }
}

/// The F Prime boolean codec.
///
/// Encoding writes the configured true/false byte. Decoding reads one byte
/// and treats anything other than the configured false byte as true, so a
/// round trip preserves truth values but not arbitrary non-canonical true
/// encodings.
#[derive(Debug, Copy, Clone)]
pub struct BoolCodec {
    true_byte: u8,
    false_byte: u8,
}

impl BoolCodec {
    pub fn new(true_byte: u8, false_byte: u8) -> Self {
        BoolCodec {
            true_byte,
            false_byte,
        }
    }
}

impl Codec for BoolCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let byte = stream.read_byte()?;
        Ok(Value::Bool(byte != self.false_byte))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::Bool(true) => out.push(self.true_byte),
            Value::Bool(false) => out.push(self.false_byte),
            ref other => {
                return Err(Error::Encode(format!("expected a bool, got {:?}", other)));
            }
        }
        Ok(())
    }

    fn width(&self) -> Option<usize> {
        Some(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream::SliceStream;

    fn decode(codec: &dyn Codec, bytes: &[u8]) -> Value {
        codec.decode(&mut SliceStream::new(bytes), None).unwrap()
    }

    #[test]
    fn u16_big_endian() {
        let codec = FundamentalCodec::new(Kind::U16, Endian::Big);
        let mut out = Vec::new();
        codec.encode(&Value::U16(258), &mut out).unwrap();
        assert_eq!(out, [0x01, 0x02]);
        assert_eq!(decode(&codec, &[0x01, 0x02]), Value::U16(258));
    }

    #[test]
    fn u16_little_endian() {
        let codec = FundamentalCodec::new(Kind::U16, Endian::Little);
        assert_eq!(decode(&codec, &[0x01, 0x02]), Value::U16(0x0201));
    }

    #[test]
    fn round_trips() {
        let cases: Vec<(FundamentalCodec, Value)> = vec![
            (FundamentalCodec::new(Kind::I8, Endian::Big), Value::I8(-5)),
            (FundamentalCodec::new(Kind::I32, Endian::Big), Value::I32(-123_456)),
            (FundamentalCodec::new(Kind::U64, Endian::Little), Value::U64(u64::max_value())),
            (FundamentalCodec::new(Kind::F32, Endian::Big), Value::F32(1.5)),
            (FundamentalCodec::new(Kind::F64, Endian::Little), Value::F64(-0.25)),
        ];
        for (codec, value) in cases {
            let mut out = Vec::new();
            codec.encode(&value, &mut out).unwrap();
            assert_eq!(out.len(), codec.width().unwrap());
            assert_eq!(decode(&codec, &out), value);
        }
    }

    #[test]
    fn empty_stream_is_end_of_stream() {
        let codec = FundamentalCodec::new(Kind::U32, Endian::Big);
        match codec.decode(&mut SliceStream::new(&[]), None) {
            Err(Error::EndOfStream) => {}
            other => panic!("expected EndOfStream, got {:?}", other),
        }
    }

    #[test]
    fn bool_defaults() {
        let codec = BoolCodec::new(0xff, 0x00);
        let mut out = Vec::new();
        codec.encode(&Value::Bool(true), &mut out).unwrap();
        codec.encode(&Value::Bool(false), &mut out).unwrap();
        assert_eq!(out, [0xff, 0x00]);
        assert_eq!(decode(&codec, &[0xff]), Value::Bool(true));
        assert_eq!(decode(&codec, &[0x7e]), Value::Bool(true));
        assert_eq!(decode(&codec, &[0x00]), Value::Bool(false));
    }
}
