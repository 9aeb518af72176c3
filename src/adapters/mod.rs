//! Hardware adapters implementing the [`app::ports`](crate::app::ports)
//! traits over `embedded-hal` digital pins.

pub mod gpio;
