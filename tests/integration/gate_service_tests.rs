//! End-to-end service tests: raw receiver events in, relay/alert calls out.

use gatectl::app::commands::GateCommand;
use gatectl::app::events::GateEvent;
use gatectl::app::ports::{OutputId, SensorId};
use gatectl::app::service::GateService;
use gatectl::config::{ButtonRole, GateConfig};
use gatectl::motion::MotionState;
use gatectl::remote::Gesture;

use crate::mock_hw::{MockHardware, RecordingSink};

// Default deployment codes.
const POWER: u32 = 0x00FD_00FF;
const UP: u32 = 0x00FD_48B7;
const UP_ALIAS: u32 = 3;
const DOWN: u32 = 0x00FD_6897;
const SWITCH: u32 = 0x00FD_40BF;

fn service(config: &GateConfig) -> (GateService, MockHardware, RecordingSink) {
    let mut svc = GateService::new(config).expect("config is valid");
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, MockHardware::new(), sink)
}

fn plain_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.open_pulse_sequence.clear();
    config
}

#[test]
fn switch_press_runs_full_open_cycle() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);
    assert!(hw.relay(OutputId::OpenRelay));
    assert_eq!(hw.live_watches(), 2);

    svc.on_sensor_edge(SensorId::TopLeftBarrier, 4000, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opened);
    assert!(!hw.relay(OutputId::OpenRelay));
    assert_eq!(hw.live_watches(), 0);

    assert!(sink.events.contains(&GateEvent::StateChanged {
        from: MotionState::Closed,
        to: MotionState::Opening,
    }));
    assert!(sink.events.contains(&GateEvent::StateChanged {
        from: MotionState::Opening,
        to: MotionState::Opened,
    }));
}

#[test]
fn switch_repeats_mid_transition_are_inert() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    let energizes = hw.energize_count();

    // The remote keeps repeating while the user holds the button.
    svc.on_receive(SWITCH, true, 100, &mut hw, &mut sink);
    svc.on_receive(SWITCH, true, 200, &mut hw, &mut sink);
    // And a fresh press mid-transition is also a no-op.
    svc.tick(500, &mut hw, &mut sink);
    svc.on_receive(SWITCH, false, 600, &mut hw, &mut sink);

    assert_eq!(hw.energize_count(), energizes);
    assert_eq!(svc.state(), MotionState::Opening);
}

#[test]
fn dead_man_up_button_through_gesture_stream() {
    // Scenario C timing on the manual up button: press, three repeats at
    // 100 ms spacing, silence. The relay stays energized the whole hold
    // and cuts ~150 ms after the last repeat.
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(UP, false, 0, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay));

    for t in [100, 200, 300] {
        svc.on_receive(UP, true, t, &mut hw, &mut sink);
        svc.tick(t, &mut hw, &mut sink);
        assert!(hw.relay(OutputId::OpenRelay));
    }

    svc.tick(449, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay));
    svc.tick(450, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::OpenRelay));

    let gestures: Vec<Gesture> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            GateEvent::GestureDetected { button: ButtonRole::Open, gesture } => Some(*gesture),
            _ => None,
        })
        .collect();
    assert_eq!(
        gestures,
        vec![
            Gesture::Press,
            Gesture::Hold,
            Gesture::Hold,
            Gesture::Hold,
            Gesture::Release
        ]
    );

    // Manual path never moved the state machine.
    assert_eq!(svc.state(), MotionState::Closed);
}

#[test]
fn up_alias_code_behaves_like_up() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(UP_ALIAS, false, 0, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay));
    // Repeats may arrive under the other alias; still one button.
    svc.on_receive(UP, true, 100, &mut hw, &mut sink);
    svc.tick(250, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::OpenRelay));
}

#[test]
fn down_button_drives_close_relay() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(DOWN, false, 0, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::CloseRelay));
    assert!(!hw.relay(OutputId::OpenRelay));

    svc.tick(300, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::CloseRelay));
}

#[test]
fn locked_gate_refuses_and_alert_self_clears() {
    // Scenario B, plus the cool-down.
    let (mut svc, mut hw, mut sink) = service(&plain_config());
    hw.set_locked(true);

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Closed);
    assert_eq!(hw.energize_count(), 0);
    assert!(hw.alerting());
    assert!(sink.events.contains(&GateEvent::InterlockRefused {
        requested: OutputId::OpenRelay
    }));

    svc.tick(999, &mut hw, &mut sink);
    assert!(hw.alerting());
    svc.tick(1000, &mut hw, &mut sink);
    assert!(!hw.alerting());
    assert!(sink.events.contains(&GateEvent::AlertCleared));
}

#[test]
fn locked_gate_blocks_manual_buttons_too() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());
    hw.set_locked(true);

    svc.on_receive(UP, false, 0, &mut hw, &mut sink);
    svc.on_receive(DOWN, false, 500, &mut hw, &mut sink);
    assert_eq!(hw.energize_count(), 0);
}

#[test]
fn power_press_is_emergency_stop() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);

    svc.on_receive(POWER, false, 1000, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Closed);
    assert!(!hw.relay(OutputId::OpenRelay));
    assert!(!hw.relay(OutputId::CloseRelay));
    assert_eq!(hw.live_watches(), 0);
    assert!(sink.events.contains(&GateEvent::ResetApplied));

    // Stuck-transient recovery: the gate can be commanded again.
    svc.on_receive(SWITCH, false, 2000, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);
}

#[test]
fn power_hold_also_stops_when_configured() {
    let mut config = plain_config();
    config.power_off_on_hold = true;
    let (mut svc, mut hw, mut sink) = service(&config);

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);

    // Only the repeat reaches the service (initial press was missed).
    svc.on_receive(POWER, true, 1000, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Closed);
    assert!(!hw.relay(OutputId::OpenRelay));
}

#[test]
fn power_hold_is_inert_by_default() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    svc.on_receive(POWER, true, 1000, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);
}

#[test]
fn pulse_sequence_runs_through_service_ticks() {
    let config = GateConfig::default(); // jiggle sequence present
    let (mut svc, mut hw, mut sink) = service(&config);

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay));

    svc.tick(1000, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::OpenRelay));
    svc.tick(1500, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay));

    // Barrier edge completes the cycle while pulses keep their own clock.
    svc.on_sensor_edge(SensorId::TopRightBarrier, 1600, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opened);
    assert!(!hw.relay(OutputId::OpenRelay));

    svc.tick(2500, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::OpenRelay));
    svc.tick(3000, &mut hw, &mut sink);
    assert!(hw.relay(OutputId::OpenRelay), "final pulse lands after the edge");
}

#[test]
fn interleaved_receivers_share_one_classifier_set() {
    // Inside and outside receivers deliver the same codes; events from
    // both are fed through the same entry point and must not double up.
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(UP, false, 0, &mut hw, &mut sink); // inside
    svc.on_receive(UP, true, 30, &mut hw, &mut sink); // outside sees the repeat
    svc.tick(180, &mut hw, &mut sink);
    assert!(!hw.relay(OutputId::OpenRelay));

    let presses = sink
        .events
        .iter()
        .filter(|e| {
            matches!(
                e,
                GateEvent::GestureDetected { button: ButtonRole::Open, gesture: Gesture::Press }
            )
        })
        .count();
    assert_eq!(presses, 1);
}

#[test]
fn direct_commands_bypass_classification() {
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.handle_command(GateCommand::SwitchState, 0, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);
    svc.handle_command(GateCommand::PowerOff, 100, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Closed);
}

#[test]
fn stale_bottom_edge_ignored_while_opening() {
    // Scenario D through the service layer.
    let (mut svc, mut hw, mut sink) = service(&plain_config());

    svc.on_receive(SWITCH, false, 0, &mut hw, &mut sink);
    svc.on_sensor_edge(SensorId::BottomRightBarrier, 500, &mut hw, &mut sink);
    assert_eq!(svc.state(), MotionState::Opening);
    assert!(hw.relay(OutputId::OpenRelay));
}

#[test]
fn rejects_invalid_configuration() {
    let mut config = GateConfig::default();
    config.buttons.power.clear();
    assert!(GateService::new(&config).is_err());
}
