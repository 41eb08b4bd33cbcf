//! Defines the error type shared by all decoders.

use std::io;

/// Errors produced while decoding F Prime data or loading a dictionary.
#[derive(Debug, Fail)]
pub enum Error {
    /// A read could not be satisfied because the stream ended.
    ///
    /// This is raised for a short read and for a truly empty stream alike.
    /// At record boundaries it doubles as the normal end-of-input signal, so
    /// the main loop treats it as completion rather than failure.
    #[fail(display = "unexpected end of stream")]
    EndOfStream,

    /// A packet carried a value that cannot be decoded further, e.g. an
    /// unknown file packet sub-type. The record is dropped; framing resumes
    /// at the next record.
    #[fail(display = "malformed packet: {}", _0)]
    MalformedPacket(String),

    /// A value handed to `Codec::encode` does not match the codec.
    #[fail(display = "cannot encode value: {}", _0)]
    Encode(String),

    /// The dictionary XML could not be parsed.
    #[fail(display = "invalid dictionary: {}", _0)]
    Dictionary(String),

    /// An invalid configuration, e.g. a type alias bound to a name that is
    /// not a fundamental type.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    /// Any other I/O failure on the input.
    #[fail(display = "{}", _0)]
    Io(#[fail(cause)] io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::EndOfStream
        } else {
            Error::Io(e)
        }
    }
}
