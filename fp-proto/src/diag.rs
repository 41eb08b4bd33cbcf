//! The warning sink used by decoders and the dictionary binder.
//!
//! Warnings report dictionary/data mismatches (unknown identifiers, unbound
//! type names, namespace collisions). They never abort decoding and must
//! never be interleaved with record output, so they are routed through this
//! trait instead of the output sink.

use std::fmt::Debug;

/// Receives the one-line warnings that decoding and binding emit.
pub trait Diagnostics: Debug {
    fn warning(&self, message: &str);
}

/// Forwards warnings to the `log` crate.
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Writes `WARNING:` lines straight to stderr, like the interactive tool.
#[derive(Debug, Default)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn warning(&self, message: &str) {
        eprintln!("WARNING: {}", message);
    }
}

/// Collects warnings in memory so tests can assert on them.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Collect(pub ::std::cell::RefCell<Vec<String>>);

#[cfg(test)]
impl Collect {
    pub fn new() -> Collect {
        Collect::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

#[cfg(test)]
impl Diagnostics for Collect {
    fn warning(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}
