//! The `Fw::Time` codec.

use byteorder::{BigEndian, WriteBytesExt};

use error::Error;
use stream::{read_u32_be, ByteStream};
use types::codec::Codec;
use types::value::{Time, Value};

use std::rc::Rc;

/// Time stamp codec.
///
/// Base and context fields are read through the `FwTimeBaseStore` /
/// `FwTimeContextStore` aliases and are present only when the corresponding
/// configuration flag was set at registry construction. Seconds and
/// microseconds are always big-endian u32.
#[derive(Debug)]
pub struct TimeCodec {
    base: Option<Rc<dyn Codec>>,
    context: Option<Rc<dyn Codec>>,
}

impl TimeCodec {
    pub fn new(base: Option<Rc<dyn Codec>>, context: Option<Rc<dyn Codec>>) -> Self {
        TimeCodec { base, context }
    }

    fn decode_field(
        codec: &Option<Rc<dyn Codec>>,
        what: &str,
        stream: &mut dyn ByteStream,
    ) -> Result<Option<u64>, Error> {
        match *codec {
            Some(ref codec) => {
                let value = codec.decode(stream, None)?;
                Ok(Some(value.as_u64().ok_or_else(|| {
                    Error::MalformedPacket(format!("time {} is not an unsigned integer", what))
                })?))
            }
            None => Ok(None),
        }
    }
}

impl Codec for TimeCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let base = Self::decode_field(&self.base, "base", stream)?;
        let context = Self::decode_field(&self.context, "context", stream)?;
        let seconds = read_u32_be(stream)?;
        let microseconds = read_u32_be(stream)?;
        Ok(Value::Time(Time {
            base,
            context,
            seconds,
            microseconds,
        }))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        let time = match *value {
            Value::Time(ref time) => time,
            ref other => {
                return Err(Error::Encode(format!("expected a time, got {:?}", other)));
            }
        };
        if let Some(ref codec) = self.base {
            let base = time
                .base
                .ok_or_else(|| Error::Encode("time is missing its base field".to_string()))?;
            codec.encode(&Value::U64(base), out)?;
        }
        if let Some(ref codec) = self.context {
            let context = time
                .context
                .ok_or_else(|| Error::Encode("time is missing its context field".to_string()))?;
            codec.encode(&Value::U64(context), out)?;
        }
        out.write_u32::<BigEndian>(time.seconds)?;
        out.write_u32::<BigEndian>(time.microseconds)?;
        Ok(())
    }

    fn width(&self) -> Option<usize> {
        let mut total = 8;
        if let Some(ref codec) = self.base {
            total += codec.width()?;
        }
        if let Some(ref codec) = self.context {
            total += codec.width()?;
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stream::SliceStream;
    use types::fundamental::{Endian, FundamentalCodec, Kind};

    fn default_codec() -> TimeCodec {
        TimeCodec::new(
            Some(Rc::new(FundamentalCodec::new(Kind::U16, Endian::Big))),
            Some(Rc::new(FundamentalCodec::new(Kind::U8, Endian::Big))),
        )
    }

    #[test]
    fn default_layout_is_eleven_bytes() {
        let codec = default_codec();
        assert_eq!(codec.width(), Some(11));
        let bytes = [0x00, 0x02, 0x01, 0x00, 0x00, 0x04, 0xd2, 0x00, 0x00, 0x00, 0x38];
        let decoded = codec.decode(&mut SliceStream::new(&bytes), None).unwrap();
        assert_eq!(
            decoded,
            Value::Time(Time {
                base: Some(2),
                context: Some(1),
                seconds: 1234,
                microseconds: 56,
            })
        );

        let mut out = Vec::new();
        codec.encode(&decoded, &mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn disabled_flags_reduce_to_eight_bytes() {
        let codec = TimeCodec::new(None, None);
        assert_eq!(codec.width(), Some(8));
        let bytes = [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
        let decoded = codec.decode(&mut SliceStream::new(&bytes), None).unwrap();
        assert_eq!(
            decoded,
            Value::Time(Time {
                base: None,
                context: None,
                seconds: 1,
                microseconds: 2,
            })
        );
    }
}
