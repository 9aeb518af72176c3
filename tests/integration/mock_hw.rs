//! Mock hardware adapter for integration tests.
//!
//! Records every output, watch and alert call so tests can assert on the
//! full command history without touching real GPIO.

use gatectl::app::events::GateEvent;
use gatectl::app::ports::{
    AlertPort, Edge, EventSink, OutputId, OutputPort, SensorId, SensorPort, WatchHandle, WatchPort,
};

// ── I/O call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoCall {
    Write { output: OutputId, energized: bool },
    Watch { sensor: SensorId, edge: Edge },
    CancelWatch { handle: WatchHandle },
    Alert,
    ClearAlert,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    /// Raw sensor levels, indexed by [`sensor_index`].
    levels: [bool; 6],
    pub calls: Vec<IoCall>,
    next_handle: u32,
}

fn sensor_index(sensor: SensorId) -> usize {
    match sensor {
        SensorId::LockLeft => 0,
        SensorId::LockRight => 1,
        SensorId::TopLeftBarrier => 2,
        SensorId::TopRightBarrier => 3,
        SensorId::BottomLeftBarrier => 4,
        SensorId::BottomRightBarrier => 5,
    }
}

#[allow(dead_code)]
impl MockHardware {
    /// All sensors high: with the default active-low lock wiring the
    /// gate starts unlocked.
    pub fn new() -> Self {
        Self {
            levels: [true; 6],
            calls: Vec::new(),
            next_handle: 0,
        }
    }

    pub fn set_level(&mut self, sensor: SensorId, level: bool) {
        self.levels[sensor_index(sensor)] = level;
    }

    /// Engage/disengage the lock (active-low pair).
    pub fn set_locked(&mut self, locked: bool) {
        self.set_level(SensorId::LockLeft, !locked);
        self.set_level(SensorId::LockRight, !locked);
    }

    /// Last commanded level of a relay output.
    pub fn relay(&self, output: OutputId) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                IoCall::Write { output: o, energized } if *o == output => Some(*energized),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Whether the alert is currently sounding.
    pub fn alerting(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                IoCall::Alert => Some(true),
                IoCall::ClearAlert => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Registered-but-not-cancelled watch count.
    pub fn live_watches(&self) -> usize {
        let registered = self.calls.iter().filter(|c| matches!(c, IoCall::Watch { .. })).count();
        let cancelled = self
            .calls
            .iter()
            .filter(|c| matches!(c, IoCall::CancelWatch { .. }))
            .count();
        registered - cancelled
    }

    pub fn energize_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, IoCall::Write { energized: true, .. }))
            .count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self, sensor: SensorId) -> bool {
        self.levels[sensor_index(sensor)]
    }
}

impl OutputPort for MockHardware {
    fn write(&mut self, output: OutputId, energized: bool) {
        self.calls.push(IoCall::Write { output, energized });
    }
}

impl WatchPort for MockHardware {
    fn watch(&mut self, sensor: SensorId, edge: Edge, _debounce_ms: u32) -> WatchHandle {
        self.next_handle += 1;
        self.calls.push(IoCall::Watch { sensor, edge });
        WatchHandle(self.next_handle)
    }

    fn cancel_watch(&mut self, handle: WatchHandle) {
        self.calls.push(IoCall::CancelWatch { handle });
    }
}

impl AlertPort for MockHardware {
    fn alert(&mut self) {
        self.calls.push(IoCall::Alert);
    }

    fn clear_alert(&mut self) {
        self.calls.push(IoCall::ClearAlert);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<GateEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &GateEvent) {
        self.events.push(*event);
    }
}
