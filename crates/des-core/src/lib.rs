//! `des-core` — foundational types for the `rust_des` simulation framework.
//!
//! This crate is a dependency of every other `des-*` crate.  It has no
//! `des-*` dependencies and only `thiserror` externally.
//!
//! # What lives here
//!
//! | Module     | Contents                                            |
//! |------------|-----------------------------------------------------|
//! | [`time`]   | The `Time` trait and its `f64` instance             |
//! | [`port`]   | `PortList` — per-port value bags with a write flag  |
//! | [`common`] | `Common` — opaque configuration bag for `start`     |
//! | [`error`]  | `PortError`                                         |

pub mod common;
pub mod error;
pub mod port;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use common::Common;
pub use error::PortError;
pub use port::PortList;
pub use time::Time;
