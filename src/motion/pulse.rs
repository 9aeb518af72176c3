//! Timed pulse sequences for opener hardware that wants discrete button
//! pulses rather than sustained contact closure.
//!
//! A sequence is a fixed list of `(offset, action)` steps applied to the
//! open relay, timed from the moment the open command was issued. The
//! sequence is pure configuration data; [`PulseRun`] is the live
//! bookkeeping the controller polls each tick. Pulses never transition
//! the motion state — only the barrier edge watch does that.

use serde::{Deserialize, Serialize};

use crate::time::deadline_reached;

/// Maximum steps in a pulse sequence (stack-allocated).
pub const MAX_PULSE_STEPS: usize = 8;

/// A configured pulse sequence. Empty means sustained contact closure.
pub type PulseSequence = heapless::Vec<PulseStep, MAX_PULSE_STEPS>;

/// What a pulse step does to the open relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulseAction {
    Energize,
    Deenergize,
}

/// One step of a pulse sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseStep {
    /// Milliseconds after the open command at which the step fires.
    pub offset_ms: u32,
    pub action: PulseAction,
}

/// A pulse sequence in flight. Created when an open cycle starts,
/// dropped when the last step has fired or on [`reset`].
///
/// [`reset`]: crate::motion::MotionController::reset
#[derive(Debug, Clone)]
pub struct PulseRun {
    sequence: PulseSequence,
    started_ms: u32,
    next: usize,
}

impl PulseRun {
    pub fn new(sequence: PulseSequence, now_ms: u32) -> Self {
        Self {
            sequence,
            started_ms: now_ms,
            next: 0,
        }
    }

    /// Pop the next step if its deadline has passed. Call in a loop so a
    /// late tick drains every overdue step in order.
    pub fn due(&mut self, now_ms: u32) -> Option<PulseAction> {
        let step = self.sequence.get(self.next)?;
        if deadline_reached(now_ms, self.started_ms.wrapping_add(step.offset_ms)) {
            self.next += 1;
            Some(step.action)
        } else {
            None
        }
    }

    /// True once every step has fired.
    pub fn finished(&self) -> bool {
        self.next >= self.sequence.len()
    }
}
