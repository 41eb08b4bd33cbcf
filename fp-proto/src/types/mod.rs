pub mod buffer;
pub mod codec;
pub mod composite;
pub mod fundamental;
pub mod time;
pub mod value;

pub use self::buffer::{AsciiBufferCodec, BufferCodec, StringCodec};
pub use self::codec::Codec;
pub use self::composite::{ArrayCodec, EnumCodec, SerializableCodec};
pub use self::fundamental::{BoolCodec, Endian, FundamentalCodec, Kind};
pub use self::time::TimeCodec;
pub use self::value::{hex, hex_prefixed, Time, Value};
