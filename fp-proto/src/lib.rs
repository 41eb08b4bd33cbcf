//! Decoder and codec library for the F Prime flight software wire format.
//!
//! The library is organized as a pipeline: a [`stream::ByteStream`] feeds a
//! record framer ([`record`]), which confines each record's bytes and hands
//! them to the packet decoder ([`packet`]). Packet payloads are opaque byte
//! blobs until an FSW dictionary ([`dictionary`]) is loaded; the dictionary
//! binder constructs a codec for every user-defined type and resolves
//! command opcodes, event ids, telemetry channel ids and parameter ids into
//! typed values.
//!
//! All codecs live in a [`registry::TypeRegistry`] keyed by type name. The
//! registry is also where the F Prime build configuration (configurable type
//! aliases like `FwOpcode`, boolean encodings, time format flags) is applied.

#![warn(missing_debug_implementations)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate num_derive;
#[macro_use]
extern crate serde_json;
extern crate byteorder;
extern crate bytes;
extern crate num_traits;
extern crate roxmltree;

pub mod diag;
pub mod dictionary;
pub mod error;
pub mod packet;
pub mod record;
pub mod registry;
pub mod stream;
mod types;

pub use error::*;
pub use types::*;
