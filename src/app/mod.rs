//! Application layer: ports, events, commands and the orchestrating
//! service. The hexagonal boundary of the crate.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
