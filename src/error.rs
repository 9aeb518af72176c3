//! Unified error types for the gate controller.
//!
//! Deliberately small: interlock refusals, redundant `switch_state`
//! requests and stale barrier edges are routine occurrences handled by
//! policy (no-op, optionally alert), not errors. What remains fallible
//! is configuration validation.

use core::fmt;

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid. The message names the offending field.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
