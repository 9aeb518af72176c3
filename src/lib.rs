//! Gate controller core library.
//!
//! Drives a two-direction gate actuator from an infrared remote.
//! The crate owns the motion state machine, the lock interlock, and the
//! press/hold/release gesture classifier; everything hardware-specific
//! (IR decoding, GPIO, the beeper) lives behind the port traits in
//! [`app::ports`] and the adapters in [`adapters`].

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod motion;
pub mod remote;
pub mod safety;

mod error;
mod time;

pub mod adapters;

pub use error::{Error, Result};
