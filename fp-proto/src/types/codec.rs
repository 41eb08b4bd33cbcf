//! The decode/encode contract shared by every serializable type.

use error::Error;
use stream::ByteStream;
use types::value::Value;

use std::fmt::Debug;

/// Decodes and encodes one wire type.
///
/// Codecs are constructed once (at registry construction for the built-ins,
/// during dictionary binding for user types) and are immutable afterwards;
/// they are shared through `Rc<dyn Codec>` handles.
pub trait Codec: Debug {
    /// Decodes one value from the stream.
    ///
    /// `length` is honored by the buffer codecs only: `Some(0)` yields an
    /// empty buffer without reading, `Some(n)` reads exactly `n` bytes, and
    /// `None` reads the rest of the (confined) stream. All other codecs know
    /// their own extent and ignore it.
    fn decode(&self, stream: &mut dyn ByteStream, length: Option<usize>) -> Result<Value, Error>;

    /// Encodes `value`, appending its wire form to `out`.
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error>;

    /// The fixed wire width of this codec in bytes, when it has one.
    fn width(&self) -> Option<usize> {
        None
    }
}
