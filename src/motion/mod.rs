//! Motion state machine for the gate actuator.
//!
//! ```text
//!            switch_state           top barrier edge
//!   Closed ───────────────▶ Opening ───────────────▶ Opened
//!     ▲                                                │
//!     │       bottom barrier edge          switch_state│
//!   Closing ◀──────────────────────────────────────────┘
//! ```
//!
//! `Opening`/`Closing` are transient: they end on the matching barrier
//! edge or an explicit [`reset`]. Every energize passes the lock
//! interlock first; a locked gate is never actuated in either direction.
//!
//! Manual open/close press/release bypasses the state machine entirely
//! (dead-man behavior: hold keeps power on, release cuts it), but still
//! goes through the interlock on every energize.
//!
//! [`reset`]: MotionController::reset

pub mod pulse;

use log::{debug, info};

use crate::app::events::GateEvent;
use crate::app::ports::{Edge, EventSink, GateIo, OutputId, SensorId, WatchHandle};
use crate::config::GateConfig;
use crate::safety::Interlock;
use pulse::{PulseAction, PulseRun, PulseSequence};

/// The actuator's logical position. `Closed` at startup by design — the
/// physical position is not verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Closed,
    Opening,
    Opened,
    Closing,
}

/// Watch handles for one transient cycle, one per redundant sensor.
/// Held as a unit so a cycle's watches are always cancelled together.
#[derive(Debug, Clone, Copy)]
struct WatchPair {
    left: WatchHandle,
    right: WatchHandle,
}

/// Owns the motion state, the interlock, per-cycle watch handles and the
/// optional pulse run. One instance per actuator.
pub struct MotionController {
    state: MotionState,
    interlock: Interlock,
    check_lock_on_release: bool,
    barrier_edge: Edge,
    barrier_debounce_ms: u32,
    open_pulse_sequence: PulseSequence,
    /// Live watch pair for the current open cycle, if any.
    open_watch: Option<WatchPair>,
    /// Live watch pair for the current close cycle, if any.
    close_watch: Option<WatchPair>,
    /// Pulse sequence in flight for the current open cycle, if any.
    pulse: Option<PulseRun>,
}

impl MotionController {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            state: MotionState::Closed,
            interlock: Interlock::new(config),
            check_lock_on_release: config.check_lock_on_release,
            barrier_edge: config.barrier_edge,
            barrier_debounce_ms: config.barrier_debounce_ms,
            open_pulse_sequence: config.open_pulse_sequence.clone(),
            open_watch: None,
            close_watch: None,
            pulse: None,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    // ── State machine path ────────────────────────────────────

    /// Toggle between fully-closed and fully-open. A no-op while
    /// mid-transition — remote repeats make redundant requests routine,
    /// so this is not an error.
    pub fn switch_state(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        match self.state {
            MotionState::Closed => self.begin_open(now_ms, hw, sink),
            MotionState::Opened => self.begin_close(now_ms, hw, sink),
            MotionState::Opening | MotionState::Closing => {
                debug!("switch_state ignored: transition in progress");
            }
        }
    }

    fn begin_open(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        if !self.interlock.permit(now_ms, hw, sink) {
            sink.emit(&GateEvent::InterlockRefused { requested: OutputId::OpenRelay });
            return;
        }

        hw.write(OutputId::OpenRelay, true);
        self.set_state(MotionState::Opening, sink);

        self.arm_open_watch(hw);
        if !self.open_pulse_sequence.is_empty() {
            self.pulse = Some(PulseRun::new(self.open_pulse_sequence.clone(), now_ms));
        }
    }

    fn begin_close(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        if !self.interlock.permit(now_ms, hw, sink) {
            sink.emit(&GateEvent::InterlockRefused { requested: OutputId::CloseRelay });
            return;
        }

        hw.write(OutputId::CloseRelay, true);
        self.set_state(MotionState::Closing, sink);
        self.arm_close_watch(hw);
    }

    /// Barrier edge delivered by the watch adapter. Completes the
    /// matching transient state; anything else is a stale or duplicate
    /// sensor event and is ignored.
    pub fn on_barrier_edge(
        &mut self,
        sensor: SensorId,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        match (self.state, sensor) {
            (MotionState::Opening, SensorId::TopLeftBarrier | SensorId::TopRightBarrier) => {
                hw.write(OutputId::OpenRelay, false);
                self.clear_open_watch(hw);
                self.set_state(MotionState::Opened, sink);
            }
            (MotionState::Closing, SensorId::BottomLeftBarrier | SensorId::BottomRightBarrier) => {
                hw.write(OutputId::CloseRelay, false);
                self.clear_close_watch(hw);
                self.set_state(MotionState::Closed, sink);
            }
            _ => {
                debug!("stale barrier edge from {sensor:?} in {:?} ignored", self.state);
            }
        }
    }

    // ── Manual dead-man path ──────────────────────────────────

    /// Manual open button down: energize, subject to the interlock.
    pub fn open_pressed(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        self.manual_energize(OutputId::OpenRelay, now_ms, hw, sink);
    }

    /// Manual open button up: cut power.
    pub fn open_released(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        self.manual_deenergize(OutputId::OpenRelay, now_ms, hw, sink);
    }

    /// Manual close button down.
    pub fn close_pressed(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        self.manual_energize(OutputId::CloseRelay, now_ms, hw, sink);
    }

    /// Manual close button up.
    pub fn close_released(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        self.manual_deenergize(OutputId::CloseRelay, now_ms, hw, sink);
    }

    fn manual_energize(
        &mut self,
        output: OutputId,
        now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        if !self.interlock.permit(now_ms, hw, sink) {
            sink.emit(&GateEvent::InterlockRefused { requested: output });
            return;
        }
        hw.write(output, true);
    }

    fn manual_deenergize(
        &mut self,
        output: OutputId,
        now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        if self.check_lock_on_release && !self.interlock.permit(now_ms, hw, sink) {
            sink.emit(&GateEvent::InterlockRefused { requested: output });
            return;
        }
        hw.write(output, false);
    }

    // ── Emergency path ────────────────────────────────────────

    /// Unconditional stop: both outputs dead, watches and any pending
    /// pulse run cancelled, alert silenced, state forced to `Closed`.
    /// Reachable from every state — this is the way out of a stuck
    /// transient caused by a faulted sensor.
    pub fn reset(&mut self, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        info!("motion: reset");
        hw.write(OutputId::OpenRelay, false);
        hw.write(OutputId::CloseRelay, false);
        self.clear_open_watch(hw);
        self.clear_close_watch(hw);
        self.pulse = None;
        self.interlock.silence(hw, sink);
        self.set_state(MotionState::Closed, sink);
        sink.emit(&GateEvent::ResetApplied);
    }

    // ── Timers ────────────────────────────────────────────────

    /// Poll deadlines: alert cool-down and due pulse steps. Pulses run
    /// against wall-clock offsets from the open command regardless of
    /// whether the barrier edge has already completed the cycle; they
    /// touch the open relay only and never the motion state.
    pub fn tick(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        self.interlock.tick(now_ms, hw, sink);

        if let Some(run) = self.pulse.as_mut() {
            while let Some(action) = run.due(now_ms) {
                match action {
                    PulseAction::Deenergize => hw.write(OutputId::OpenRelay, false),
                    PulseAction::Energize => {
                        // Re-energize steps pass the interlock like any
                        // other energize.
                        if self.interlock.permit(now_ms, hw, sink) {
                            hw.write(OutputId::OpenRelay, true);
                        } else {
                            sink.emit(&GateEvent::InterlockRefused {
                                requested: OutputId::OpenRelay,
                            });
                        }
                    }
                }
            }
            if run.finished() {
                self.pulse = None;
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_state(&mut self, next: MotionState, sink: &mut impl EventSink) {
        if next == self.state {
            return;
        }
        info!("motion: {:?} -> {next:?}", self.state);
        sink.emit(&GateEvent::StateChanged { from: self.state, to: next });
        self.state = next;
    }

    fn arm_open_watch(&mut self, hw: &mut impl GateIo) {
        self.clear_open_watch(hw); // cancel before reassign, never leak
        self.open_watch = Some(WatchPair {
            left: hw.watch(SensorId::TopLeftBarrier, self.barrier_edge, self.barrier_debounce_ms),
            right: hw.watch(SensorId::TopRightBarrier, self.barrier_edge, self.barrier_debounce_ms),
        });
    }

    fn arm_close_watch(&mut self, hw: &mut impl GateIo) {
        self.clear_close_watch(hw);
        self.close_watch = Some(WatchPair {
            left: hw.watch(
                SensorId::BottomLeftBarrier,
                self.barrier_edge,
                self.barrier_debounce_ms,
            ),
            right: hw.watch(
                SensorId::BottomRightBarrier,
                self.barrier_edge,
                self.barrier_debounce_ms,
            ),
        });
    }

    fn clear_open_watch(&mut self, hw: &mut impl GateIo) {
        if let Some(pair) = self.open_watch.take() {
            hw.cancel_watch(pair.left);
            hw.cancel_watch(pair.right);
        }
    }

    fn clear_close_watch(&mut self, hw: &mut impl GateIo) {
        if let Some(pair) = self.close_watch.take() {
            hw.cancel_watch(pair.left);
            hw.cancel_watch(pair.right);
        }
    }
}
