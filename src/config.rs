//! System configuration parameters.
//!
//! All per-deployment tunables: which IR codes map to which logical
//! button, gesture timing windows, lock sensor wiring polarity, the
//! interlock refusal policy, barrier watch parameters and the optional
//! open-side pulse sequence. Defaults carry the values of the reference
//! deployment; real installations differ mainly in codes, polarity and
//! the alert cool-down.

use serde::{Deserialize, Serialize};

use crate::app::ports::Edge;
use crate::error::{Error, Result};
use crate::motion::pulse::{PulseAction, PulseSequence, PulseStep};

/// Maximum raw-code aliases per logical button (stack-allocated).
pub const MAX_ALIAS_CODES: usize = 4;

/// Raw codes for one logical button. Several remotes (or several buttons
/// on one remote) can alias to the same role.
pub type CodeList = heapless::Vec<u32, MAX_ALIAS_CODES>;

/// The logical buttons the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ButtonRole {
    /// Emergency power-off: outputs dead, state machine reset.
    Power = 0,
    /// Manual dead-man open (press energizes, release cuts power).
    Open = 1,
    /// Manual dead-man close.
    Close = 2,
    /// Edge-driven toggle between fully-closed and fully-open.
    SwitchState = 3,
}

impl ButtonRole {
    /// Total number of roles — used to size per-role arrays.
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] =
        [Self::Power, Self::Open, Self::Close, Self::SwitchState];
}

/// Raw-code assignment per logical button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonCodes {
    pub power: CodeList,
    pub open: CodeList,
    pub close: CodeList,
    pub switch_state: CodeList,
}

impl ButtonCodes {
    pub fn for_role(&self, role: ButtonRole) -> &CodeList {
        match role {
            ButtonRole::Power => &self.power,
            ButtonRole::Open => &self.open,
            ButtonRole::Close => &self.close,
            ButtonRole::SwitchState => &self.switch_state,
        }
    }
}

/// Which raw level on the lock sensor pair means "locked".
///
/// Both wirings exist in the field: normally-closed switches read low
/// when the lock is engaged, normally-open ones read high. This is a
/// property of the installation, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPolarity {
    /// Locked when either sensor reads low.
    ActiveLow,
    /// Locked when either sensor reads high.
    ActiveHigh,
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    // --- Remote buttons ---
    pub buttons: ButtonCodes,

    // --- Gesture timing ---
    /// Release inferred this long after an initial press with no repeat.
    pub press_release_ms: u32,
    /// Release inferred this long after the last auto-repeat.
    pub hold_release_ms: u32,

    // --- Interlock ---
    /// Lock sensor wiring polarity.
    pub lock_polarity: LockPolarity,
    /// Sound the alert when an actuation is refused while locked.
    pub alert_on_interlock: bool,
    /// How long the refusal alert stays on before self-clearing.
    pub alert_cooldown_ms: u32,
    /// Also run the interlock check before manual de-energize.
    pub check_lock_on_release: bool,

    // --- Barrier watches ---
    /// Edge polarity of the end-stop sensors.
    pub barrier_edge: Edge,
    /// Hardware/driver debounce quiescence window for barrier watches.
    pub barrier_debounce_ms: u32,

    // --- Power button ---
    /// Treat a power-button hold like a press (some remotes repeat fast
    /// enough that the press gesture alone is easy to miss).
    pub power_off_on_hold: bool,

    // --- Pulse sequence ---
    /// Timed pulses applied to the open relay after an open command.
    /// Empty for openers driven by sustained contact closure.
    pub open_pulse_sequence: PulseSequence,
}

impl Default for GateConfig {
    fn default() -> Self {
        let mut pulses = PulseSequence::new();
        for step in [
            PulseStep { offset_ms: 1000, action: PulseAction::Deenergize },
            PulseStep { offset_ms: 1500, action: PulseAction::Energize },
            PulseStep { offset_ms: 2500, action: PulseAction::Deenergize },
            PulseStep { offset_ms: 3000, action: PulseAction::Energize },
        ] {
            // Cannot fail: 4 steps < MAX_PULSE_STEPS.
            let _ = pulses.push(step);
        }

        Self {
            buttons: ButtonCodes {
                power: heapless::Vec::from_slice(&[0x00FD_00FF]).unwrap_or_default(),
                open: heapless::Vec::from_slice(&[0x00FD_48B7, 3]).unwrap_or_default(),
                close: heapless::Vec::from_slice(&[0x00FD_6897]).unwrap_or_default(),
                switch_state: heapless::Vec::from_slice(&[0x00FD_40BF]).unwrap_or_default(),
            },

            press_release_ms: 300,
            hold_release_ms: 150,

            lock_polarity: LockPolarity::ActiveLow,
            alert_on_interlock: true,
            alert_cooldown_ms: 1000,
            check_lock_on_release: false,

            barrier_edge: Edge::Falling,
            barrier_debounce_ms: 10,

            power_off_on_hold: false,

            open_pulse_sequence: pulses,
        }
    }
}

impl GateConfig {
    /// Reject inconsistent configurations instead of clamping them.
    pub fn validate(&self) -> Result<()> {
        for role in ButtonRole::ALL {
            if self.buttons.for_role(role).is_empty() {
                return Err(Error::Config("every button role needs at least one code"));
            }
        }
        for (i, a) in ButtonRole::ALL.iter().enumerate() {
            for b in &ButtonRole::ALL[i + 1..] {
                let codes = self.buttons.for_role(*a);
                if codes.iter().any(|c| self.buttons.for_role(*b).contains(c)) {
                    return Err(Error::Config("raw code assigned to two button roles"));
                }
            }
        }

        if self.press_release_ms == 0 || self.hold_release_ms == 0 {
            return Err(Error::Config("gesture release windows must be non-zero"));
        }
        if self.hold_release_ms > self.press_release_ms {
            return Err(Error::Config(
                "hold release window must not exceed press release window",
            ));
        }

        if self.alert_on_interlock && self.alert_cooldown_ms == 0 {
            return Err(Error::Config("alert cool-down must be non-zero"));
        }

        let offsets = self.open_pulse_sequence.iter().map(|s| s.offset_ms);
        if !offsets.clone().zip(offsets.skip(1)).all(|(a, b)| a < b) {
            return Err(Error::Config("pulse offsets must be strictly increasing"));
        }

        Ok(())
    }
}
