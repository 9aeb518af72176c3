//! Port traits — the boundary between the control core and the I/O layer.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GateService (domain)
//! ```
//!
//! The receiver driver, GPIO layer and beeper implement these traits;
//! the domain core consumes them via generics and never touches
//! hardware directly. Everything here is deliberately boolean-level:
//! protocol decoding and pin numbering stay on the adapter side.

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// Identities
// ───────────────────────────────────────────────────────────────

/// The digital sensors the core reads or watches.
///
/// Lock and barrier sensors come in redundant left/right pairs; for
/// barriers a transition on either is sufficient (first one wins), for
/// locks either sensor indicating "locked" blocks actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorId {
    LockLeft,
    LockRight,
    TopLeftBarrier,
    TopRightBarrier,
    BottomLeftBarrier,
    BottomRightBarrier,
}

/// The relay-style outputs the core drives. Written exclusively by the
/// motion controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputId {
    OpenRelay,
    CloseRelay,
}

/// Edge polarity for sensor watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Rising,
    Falling,
}

/// Opaque token for a registered edge watch. Obtained from
/// [`WatchPort::watch`], consumed by [`WatchPort::cancel_watch`].
/// Holders must cancel a live handle before replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchHandle(pub u32);

// ───────────────────────────────────────────────────────────────
// Ports
// ───────────────────────────────────────────────────────────────

/// Read-side port: synchronous digital sensor reads.
pub trait SensorPort {
    /// Current raw level of the sensor (polarity is interpreted by the
    /// core, not the adapter).
    fn read(&mut self, sensor: SensorId) -> bool;
}

/// Write-side port: relay outputs.
pub trait OutputPort {
    fn write(&mut self, output: OutputId, energized: bool);
}

/// Edge-watch registration. The adapter delivers matching debounced
/// transitions back to the service as sensor-edge events; it stops
/// delivering for a handle once that handle is cancelled.
pub trait WatchPort {
    fn watch(&mut self, sensor: SensorId, edge: Edge, debounce_ms: u32) -> WatchHandle;
    fn cancel_watch(&mut self, handle: WatchHandle);
}

/// Audible alert driver (refusal beeper).
pub trait AlertPort {
    fn alert(&mut self);
    fn clear_alert(&mut self);
}

/// The domain emits structured [`GateEvent`](super::events::GateEvent)s
/// through this port. Adapters decide where they go (serial log, bus,
/// test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::GateEvent);
}

/// Convenience bound for the full hardware surface the controller needs.
/// Blanket-implemented so any adapter providing the four I/O ports
/// qualifies automatically.
pub trait GateIo: SensorPort + OutputPort + WatchPort + AlertPort {}

impl<T: SensorPort + OutputPort + WatchPort + AlertPort> GateIo for T {}
