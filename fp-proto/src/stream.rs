//! Byte stream abstractions with position tracking.
//!
//! All decoding runs against a [`ByteStream`]. The framers in [`record`]
//! slice each record's bytes into a [`SliceStream`]; that confinement is the
//! only thing bounding the "read the rest" payload decoders further down.
//!
//! [`record`]: ../record/index.html

use byteorder::{BigEndian, ByteOrder};

use error::Error;

use std::io::{self, Read};

/// A sequential byte source with optional position reporting.
pub trait ByteStream {
    /// Reads exactly `buf.len()` bytes.
    ///
    /// Fails with [`Error::EndOfStream`] when fewer bytes are available; a
    /// short read and a truly empty stream are signaled identically.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;

    /// Reads all remaining bytes ("read the rest").
    fn read_to_end(&mut self) -> Result<Vec<u8>, Error>;

    /// Current offset from the start of the source, when the source is
    /// seekable. `None` for pipes and sockets.
    fn offset(&self) -> Option<u64>;

    /// Reads exactly `n` bytes into a fresh buffer.
    fn read_n(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0; n];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a single byte.
    fn read_byte(&mut self) -> Result<u8, Error> {
        let mut buf = [0];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }
}

pub(crate) fn read_u16_be(stream: &mut dyn ByteStream) -> Result<u16, Error> {
    let mut buf = [0; 2];
    stream.read_exact(&mut buf)?;
    Ok(BigEndian::read_u16(&buf))
}

pub(crate) fn read_u32_be(stream: &mut dyn ByteStream) -> Result<u32, Error> {
    let mut buf = [0; 4];
    stream.read_exact(&mut buf)?;
    Ok(BigEndian::read_u32(&buf))
}

/// Wraps an `io::Read` source, counting consumed bytes.
#[derive(Debug)]
pub struct ReaderStream<R: Read> {
    inner: R,
    position: u64,
    seekable: bool,
}

impl<R: Read> ReaderStream<R> {
    /// A stream whose absolute position is unknown, e.g. stdin. Record
    /// offsets will be reported as `None`.
    pub fn new(inner: R) -> Self {
        ReaderStream {
            inner,
            position: 0,
            seekable: false,
        }
    }

    /// A stream that starts at offset zero of a seekable source, e.g. a file
    /// opened at the beginning. Record offsets will be reported.
    pub fn seekable(inner: R) -> Self {
        ReaderStream {
            inner,
            position: 0,
            seekable: true,
        }
    }
}

impl<R: Read> ByteStream for ReaderStream<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(Error::EndOfStream),
                Ok(n) => {
                    filled += n;
                    self.position += n as u64;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        let n = self.inner.read_to_end(&mut buf)?;
        self.position += n as u64;
        Ok(buf)
    }

    fn offset(&self) -> Option<u64> {
        if self.seekable {
            Some(self.position)
        } else {
            None
        }
    }
}

/// An in-memory sub-stream over a byte slice.
///
/// This is how "read the rest" decoders are confined to the bytes of a
/// single record or payload.
#[derive(Debug)]
pub struct SliceStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceStream { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl<'a> ByteStream for SliceStream<'a> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        if self.remaining() < buf.len() {
            return Err(Error::EndOfStream);
        }
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>, Error> {
        let rest = self.data[self.pos..].to_vec();
        self.pos = self.data.len();
        Ok(rest)
    }

    fn offset(&self) -> Option<u64> {
        Some(self.pos as u64)
    }
}
