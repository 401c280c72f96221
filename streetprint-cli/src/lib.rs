//! Support library for the `streetprint` binary.
//!
//! Exposes the command pipeline and logging setup so integration tests can
//! run commands without spawning a process.

pub mod cli;
pub mod logging;
