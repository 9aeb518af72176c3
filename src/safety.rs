//! Lock interlock.
//!
//! The interlock runs **before every output energize** (and, when
//! configured, before manual de-energize too). It reads the redundant
//! lock sensor pair and refuses the action while the lock is engaged.
//!
//! ## Refusal lifecycle
//!
//! 1. An actuation is requested while a lock sensor asserts.
//! 2. [`Interlock::permit`] returns `false`; the caller does not touch
//!    the output.
//! 3. If configured, the alert sounds and a self-clear deadline is
//!    armed. A repeated refusal re-arms the deadline rather than
//!    stacking a second one.
//! 4. [`Interlock::tick`] clears the alert once the cool-down lapses.
//!
//! A refusal is a policy outcome, not an error: the user retries with
//! another button press once the lock is released.

use log::{info, warn};

use crate::app::events::GateEvent;
use crate::app::ports::{AlertPort, EventSink, SensorId, SensorPort};
use crate::config::{GateConfig, LockPolarity};
use crate::time::deadline_reached;

/// Lock interlock with an optional self-clearing refusal alert.
pub struct Interlock {
    polarity: LockPolarity,
    alert_on_refusal: bool,
    alert_cooldown_ms: u32,
    /// Deadline at which a sounding alert self-clears.
    alert_clear_at_ms: Option<u32>,
}

impl Interlock {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            polarity: config.lock_polarity,
            alert_on_refusal: config.alert_on_interlock,
            alert_cooldown_ms: config.alert_cooldown_ms,
            alert_clear_at_ms: None,
        }
    }

    /// Read both lock sensors. Either one indicating "locked" locks the
    /// gate — the pair is redundant, not a quorum.
    pub fn is_locked(&self, hw: &mut impl SensorPort) -> bool {
        let left = hw.read(SensorId::LockLeft);
        let right = hw.read(SensorId::LockRight);
        match self.polarity {
            LockPolarity::ActiveLow => !left || !right,
            LockPolarity::ActiveHigh => left || right,
        }
    }

    /// Interlock check. Returns `true` when the actuation may proceed.
    /// On refusal, applies the configured alert policy.
    pub fn permit(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + AlertPort),
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.is_locked(hw) {
            return true;
        }

        warn!("interlock: gate locked, actuation refused");
        if self.alert_on_refusal {
            let fresh = self.alert_clear_at_ms.take().is_none();
            hw.alert();
            self.alert_clear_at_ms = Some(now_ms.wrapping_add(self.alert_cooldown_ms));
            if fresh {
                sink.emit(&GateEvent::AlertRaised);
            }
        }
        false
    }

    /// Self-clear a sounding alert once its cool-down lapses.
    pub fn tick(&mut self, now_ms: u32, hw: &mut impl AlertPort, sink: &mut impl EventSink) {
        if let Some(at) = self.alert_clear_at_ms {
            if deadline_reached(now_ms, at) {
                self.alert_clear_at_ms = None;
                hw.clear_alert();
                sink.emit(&GateEvent::AlertCleared);
                info!("interlock: alert cleared");
            }
        }
    }

    /// Kill a sounding alert immediately (power-off path).
    pub fn silence(&mut self, hw: &mut impl AlertPort, sink: &mut impl EventSink) {
        if self.alert_clear_at_ms.take().is_some() {
            hw.clear_alert();
            sink.emit(&GateEvent::AlertCleared);
        }
    }

    /// True while the refusal alert is sounding.
    pub fn alert_active(&self) -> bool {
        self.alert_clear_at_ms.is_some()
    }
}
