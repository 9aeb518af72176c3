//! GPIO adapter over `embedded-hal` 1.0 digital pins.
//!
//! [`GpioBank`] bundles the six sensors, the two relay outputs and the
//! buzzer into one implementation of the full
//! [`GateIo`](crate::app::ports::GateIo) surface. Edge
//! watches are realized by software polling with a quiescence debounce:
//! the integrator calls [`GpioBank::poll_edges`] from the main loop and
//! forwards fired edges into
//! [`GateService::on_sensor_edge`](crate::app::service::GateService::on_sensor_edge).
//!
//! ## Fail-safe reads
//!
//! A pin read error is logged and reported as a low level. With the
//! default active-low lock wiring an unreadable lock sensor therefore
//! reads as *locked*, which blocks actuation rather than permitting it.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
use log::warn;

use crate::app::ports::{
    AlertPort, Edge, OutputId, OutputPort, SensorId, SensorPort, WatchHandle, WatchPort,
};

/// Maximum concurrently registered edge watches (stack-allocated).
/// The controller needs at most two per transient cycle.
const MAX_WATCHES: usize = 8;

/// The physical pin set of one gate installation.
pub struct GpioPins<I, O> {
    pub lock_left: I,
    pub lock_right: I,
    pub top_left: I,
    pub top_right: I,
    pub bottom_left: I,
    pub bottom_right: I,
    pub open_relay: O,
    pub close_relay: O,
    pub buzzer: O,
}

/// One registered software watch.
#[derive(Debug, Clone, Copy)]
struct WatchEntry {
    handle: WatchHandle,
    sensor: SensorId,
    edge: Edge,
    debounce_ms: u32,
    /// Last committed (debounced) level.
    last_level: bool,
    /// A level change awaiting its quiescence window: (since_ms, level).
    pending: Option<(u32, bool)>,
}

/// Complete [`GateIo`](crate::app::ports::GateIo) implementation over a
/// [`GpioPins`] set.
pub struct GpioBank<I: InputPin, O: OutputPin> {
    pins: GpioPins<I, O>,
    /// Buzzers on the reference hardware sound when driven low.
    buzzer_active_low: bool,
    watches: heapless::Vec<WatchEntry, MAX_WATCHES>,
    next_handle: u32,
}

impl<I: InputPin, O: OutputPin> GpioBank<I, O> {
    pub fn new(pins: GpioPins<I, O>, buzzer_active_low: bool) -> Self {
        let mut bank = Self {
            pins,
            buzzer_active_low,
            watches: heapless::Vec::new(),
            next_handle: 0,
        };
        // Beeper idle from the start.
        bank.clear_alert();
        bank
    }

    /// Run software edge detection. Call from the main loop at least
    /// every few milliseconds; `on_edge` receives each debounced,
    /// polarity-matching transition.
    pub fn poll_edges(&mut self, now_ms: u32, mut on_edge: impl FnMut(SensorId)) {
        let levels = Self::input_levels(&mut self.pins);

        for w in self.watches.iter_mut() {
            let level = levels[sensor_index(w.sensor)];
            match w.pending {
                None => {
                    if level != w.last_level {
                        w.pending = Some((now_ms, level));
                    }
                }
                Some((since_ms, pending_level)) => {
                    if level != pending_level {
                        // Bounced. Restart the quiescence window, or drop
                        // the candidate if the signal went back home.
                        w.pending = if level == w.last_level {
                            None
                        } else {
                            Some((now_ms, level))
                        };
                    } else if now_ms.wrapping_sub(since_ms) >= w.debounce_ms {
                        w.last_level = level;
                        w.pending = None;
                        let matches_polarity = match w.edge {
                            Edge::Rising => level,
                            Edge::Falling => !level,
                        };
                        if matches_polarity {
                            on_edge(w.sensor);
                        }
                    }
                }
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Snapshot of all six input levels, indexed by [`sensor_index`].
    fn input_levels(pins: &mut GpioPins<I, O>) -> [bool; 6] {
        [
            read_pin(&mut pins.lock_left, SensorId::LockLeft),
            read_pin(&mut pins.lock_right, SensorId::LockRight),
            read_pin(&mut pins.top_left, SensorId::TopLeftBarrier),
            read_pin(&mut pins.top_right, SensorId::TopRightBarrier),
            read_pin(&mut pins.bottom_left, SensorId::BottomLeftBarrier),
            read_pin(&mut pins.bottom_right, SensorId::BottomRightBarrier),
        ]
    }

    fn write_pin(pin: &mut O, state: bool, what: &str) {
        if pin.set_state(PinState::from(state)).is_err() {
            warn!("gpio: write to {what} failed");
        }
    }
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

fn read_pin<I: InputPin>(pin: &mut I, sensor: SensorId) -> bool {
    match pin.is_high() {
        Ok(level) => level,
        Err(_) => {
            warn!("gpio: read of {sensor:?} failed, reporting low");
            false
        }
    }
}

impl<I: InputPin, O: OutputPin> SensorPort for GpioBank<I, O> {
    fn read(&mut self, sensor: SensorId) -> bool {
        let pins = &mut self.pins;
        match sensor {
            SensorId::LockLeft => read_pin(&mut pins.lock_left, sensor),
            SensorId::LockRight => read_pin(&mut pins.lock_right, sensor),
            SensorId::TopLeftBarrier => read_pin(&mut pins.top_left, sensor),
            SensorId::TopRightBarrier => read_pin(&mut pins.top_right, sensor),
            SensorId::BottomLeftBarrier => read_pin(&mut pins.bottom_left, sensor),
            SensorId::BottomRightBarrier => read_pin(&mut pins.bottom_right, sensor),
        }
    }
}

impl<I: InputPin, O: OutputPin> OutputPort for GpioBank<I, O> {
    fn write(&mut self, output: OutputId, energized: bool) {
        match output {
            OutputId::OpenRelay => Self::write_pin(&mut self.pins.open_relay, energized, "open relay"),
            OutputId::CloseRelay => {
                Self::write_pin(&mut self.pins.close_relay, energized, "close relay");
            }
        }
    }
}

impl<I: InputPin, O: OutputPin> WatchPort for GpioBank<I, O> {
    fn watch(&mut self, sensor: SensorId, edge: Edge, debounce_ms: u32) -> WatchHandle {
        self.next_handle += 1;
        let handle = WatchHandle(self.next_handle);

        let last_level = self.read(sensor);
        let entry = WatchEntry {
            handle,
            sensor,
            edge,
            debounce_ms,
            last_level,
            pending: None,
        };
        if self.watches.push(entry).is_err() {
            // Capacity is sized for the controller's worst case; hitting
            // this means a caller is leaking handles.
            warn!("gpio: watch table full, watch on {sensor:?} dropped");
        }
        handle
    }

    fn cancel_watch(&mut self, handle: WatchHandle) {
        if let Some(pos) = self.watches.iter().position(|w| w.handle == handle) {
            self.watches.swap_remove(pos);
        }
    }
}

impl<I: InputPin, O: OutputPin> AlertPort for GpioBank<I, O> {
    fn alert(&mut self) {
        Self::write_pin(&mut self.pins.buzzer, !self.buzzer_active_low, "buzzer");
    }

    fn clear_alert(&mut self) {
        Self::write_pin(&mut self.pins.buzzer, self.buzzer_active_low, "buzzer");
    }
}
