//! Opaque and ASCII buffer codecs, plus the length-prefixed string codec.

use bytes::Bytes;

use error::Error;
use stream::ByteStream;
use types::codec::Codec;
use types::value::Value;

use std::rc::Rc;

fn read_buffer(stream: &mut dyn ByteStream, length: Option<usize>) -> Result<Vec<u8>, Error> {
    match length {
        Some(0) => Ok(Vec::new()),
        Some(n) => stream.read_n(n),
        None => stream.read_to_end(),
    }
}

fn into_ascii(data: Vec<u8>) -> Result<String, Error> {
    if !data.is_ascii() {
        return Err(Error::MalformedPacket("buffer is not ASCII".to_string()));
    }
    String::from_utf8(data).map_err(|e| Error::MalformedPacket(e.to_string()))
}

/// An opaque byte payload.
///
/// Without an explicit `length` this reads the rest of the stream, which is
/// why callers must confine the stream to the payload's bytes first.
#[derive(Debug, Copy, Clone)]
pub struct BufferCodec;

impl Codec for BufferCodec {
    fn decode(&self, stream: &mut dyn ByteStream, length: Option<usize>) -> Result<Value, Error> {
        Ok(Value::Bytes(Bytes::from(read_buffer(stream, length)?)))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::Bytes(ref data) => {
                out.extend_from_slice(data);
                Ok(())
            }
            ref other => Err(Error::Encode(format!("expected bytes, got {:?}", other))),
        }
    }
}

/// Like [`BufferCodec`], but the bytes must form an ASCII string.
///
/// No length information is part of the wire format.
#[derive(Debug, Copy, Clone)]
pub struct AsciiBufferCodec;

impl Codec for AsciiBufferCodec {
    fn decode(&self, stream: &mut dyn ByteStream, length: Option<usize>) -> Result<Value, Error> {
        Ok(Value::Ascii(into_ascii(read_buffer(stream, length)?)?))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::Ascii(ref string) if string.is_ascii() => {
                out.extend_from_slice(string.as_bytes());
                Ok(())
            }
            ref other => Err(Error::Encode(format!(
                "expected an ASCII string, got {:?}",
                other
            ))),
        }
    }
}

/// A length-prefixed ASCII string: an `FwBuffSize` length field followed by
/// that many bytes of payload.
#[derive(Debug)]
pub struct StringCodec {
    size: Rc<dyn Codec>,
}

impl StringCodec {
    pub fn new(size: Rc<dyn Codec>) -> Self {
        StringCodec { size }
    }
}

impl Codec for StringCodec {
    fn decode(&self, stream: &mut dyn ByteStream, _length: Option<usize>) -> Result<Value, Error> {
        let length = self
            .size
            .decode(stream, None)?
            .as_u64()
            .ok_or_else(|| Error::MalformedPacket("string length is not an unsigned integer".to_string()))?;
        let data = stream.read_n(length as usize)?;
        Ok(Value::String(into_ascii(data)?))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        match *value {
            Value::String(ref string) if string.is_ascii() => {
                self.size.encode(&Value::U64(string.len() as u64), out)?;
                out.extend_from_slice(string.as_bytes());
                Ok(())
            }
            ref other => Err(Error::Encode(format!(
                "expected an ASCII string, got {:?}",
                other
            ))),
        }
    }
}
