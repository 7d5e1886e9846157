//! Core error type.
//!
//! Port lookups are the only fallible operation at this layer.  Kernel and
//! loader crates define their own error enums and wrap `PortError` via
//! `#[from]` where routing code surfaces it.

use thiserror::Error;

/// Failed port lookup on a [`PortList`][crate::PortList].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("unknown port {0:?}")]
    UnknownPort(String),

    #[error("port index {index} out of range ({len} ports)")]
    OutOfRange { index: usize, len: usize },
}
