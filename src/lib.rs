//! Support crate for the `fpdt` binary: record printers and command line
//! option handling.
//!
//! The decoding itself lives in the `fp_proto` crate; this crate only turns
//! decoded records into output lines and CLI options into an
//! `fp_proto::registry::Config`.

extern crate fp_proto;
#[macro_use]
extern crate serde_json;

pub mod config;
pub mod printer;
