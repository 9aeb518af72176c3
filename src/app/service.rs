//! Gate service — the orchestrating core.
//!
//! Owns one [`ButtonClassifier`] per logical button and the
//! [`MotionController`], and routes between them:
//!
//! ```text
//!  receiver ──▶ on_receive ──▶ classifiers ──▶ gestures ──▶ commands
//!                                                              │
//!  watch adapter ──▶ on_sensor_edge ──────────────▶ MotionController
//!  timer source  ──▶ tick ─────────────────────────▶   │
//!                                                      ▼
//!                                            OutputPort / AlertPort
//! ```
//!
//! All three entry points run in the single callback context of the
//! caller's event loop; nothing blocks and nothing is shared.

use log::info;

use crate::config::{ButtonRole, GateConfig};
use crate::error::Result;
use crate::motion::{MotionController, MotionState};
use crate::remote::{ButtonClassifier, Gesture};

use super::commands::GateCommand;
use super::events::GateEvent;
use super::ports::{EventSink, GateIo, SensorId};

/// The application service. One instance per actuator; any number of
/// physical receivers may feed events into it.
pub struct GateService {
    /// Indexed by `ButtonRole as usize`.
    classifiers: [ButtonClassifier; ButtonRole::COUNT],
    controller: MotionController,
    power_off_on_hold: bool,
}

impl GateService {
    /// Construct the service. Fails if the configuration is inconsistent.
    pub fn new(config: &GateConfig) -> Result<Self> {
        config.validate()?;

        let classifier = |role: ButtonRole| {
            ButtonClassifier::new(
                config.buttons.for_role(role).clone(),
                config.press_release_ms,
                config.hold_release_ms,
            )
        };

        Ok(Self {
            classifiers: ButtonRole::ALL.map(classifier),
            controller: MotionController::new(config),
            power_off_on_hold: config.power_off_on_hold,
        })
    }

    /// Announce startup. The motion state starts `Closed` by design; the
    /// physical gate position is not verified.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!("gate service started in {:?}", self.state());
        sink.emit(&GateEvent::Started);
    }

    pub fn state(&self) -> MotionState {
        self.controller.state()
    }

    // ── Entry points ──────────────────────────────────────────

    /// One decoded remote pulse, from any receiver.
    pub fn on_receive(
        &mut self,
        code: u32,
        repeat: bool,
        now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        for role in ButtonRole::ALL {
            if let Some(gesture) = self.classifiers[role as usize].on_receive(code, repeat, now_ms)
            {
                sink.emit(&GateEvent::GestureDetected { button: role, gesture });
                self.dispatch(role, gesture, now_ms, hw, sink);
            }
        }
    }

    /// A debounced barrier edge delivered by the watch adapter.
    pub fn on_sensor_edge(
        &mut self,
        sensor: SensorId,
        _now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        self.controller.on_barrier_edge(sensor, hw, sink);
    }

    /// Poll all pending deadlines: inferred releases, the alert
    /// cool-down and due pulse steps. Call at least every few
    /// milliseconds of wall time.
    pub fn tick(&mut self, now_ms: u32, hw: &mut impl GateIo, sink: &mut impl EventSink) {
        for role in ButtonRole::ALL {
            if let Some(gesture) = self.classifiers[role as usize].tick(now_ms) {
                sink.emit(&GateEvent::GestureDetected { button: role, gesture });
                self.dispatch(role, gesture, now_ms, hw, sink);
            }
        }
        self.controller.tick(now_ms, hw, sink);
    }

    /// Apply a command directly, bypassing gesture classification.
    pub fn handle_command(
        &mut self,
        command: GateCommand,
        now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        match command {
            GateCommand::SwitchState => self.controller.switch_state(now_ms, hw, sink),
            GateCommand::OpenPressed => self.controller.open_pressed(now_ms, hw, sink),
            GateCommand::OpenReleased => self.controller.open_released(now_ms, hw, sink),
            GateCommand::ClosePressed => self.controller.close_pressed(now_ms, hw, sink),
            GateCommand::CloseReleased => self.controller.close_released(now_ms, hw, sink),
            GateCommand::PowerOff => self.controller.reset(hw, sink),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Map a classified gesture to a command for its button role.
    /// Gestures with no mapping (e.g. a hold on the switch button) are
    /// deliberately inert.
    fn dispatch(
        &mut self,
        role: ButtonRole,
        gesture: Gesture,
        now_ms: u32,
        hw: &mut impl GateIo,
        sink: &mut impl EventSink,
    ) {
        let command = match (role, gesture) {
            (ButtonRole::SwitchState, Gesture::Press) => Some(GateCommand::SwitchState),
            (ButtonRole::Open, Gesture::Press) => Some(GateCommand::OpenPressed),
            (ButtonRole::Open, Gesture::Release) => Some(GateCommand::OpenReleased),
            (ButtonRole::Close, Gesture::Press) => Some(GateCommand::ClosePressed),
            (ButtonRole::Close, Gesture::Release) => Some(GateCommand::CloseReleased),
            (ButtonRole::Power, Gesture::Press) => Some(GateCommand::PowerOff),
            (ButtonRole::Power, Gesture::Hold) if self.power_off_on_hold => {
                Some(GateCommand::PowerOff)
            }
            _ => None,
        };

        if let Some(command) = command {
            self.handle_command(command, now_ms, hw, sink);
        }
    }
}
