//! Outbound application events.
//!
//! The [`GateService`](super::service::GateService) and the motion
//! controller emit these through the [`EventSink`](super::ports::EventSink)
//! port. Adapters on the other side decide what to do with them — log to
//! serial, publish, or record in tests.

use super::ports::OutputId;
use crate::config::ButtonRole;
use crate::motion::MotionState;
use crate::remote::Gesture;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// The service has started.
    Started,

    /// A raw receive stream produced a classified gesture.
    GestureDetected { button: ButtonRole, gesture: Gesture },

    /// The motion state machine transitioned.
    StateChanged { from: MotionState, to: MotionState },

    /// An actuation was refused because the gate is locked.
    InterlockRefused { requested: OutputId },

    /// The refusal alert was raised / self-cleared after its cool-down.
    AlertRaised,
    AlertCleared,

    /// Emergency reset: outputs dead, state forced to `Closed`.
    ResetApplied,
}
