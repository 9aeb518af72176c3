//! Inbound commands to the gate service.
//!
//! The gesture router produces these from classified remote gestures;
//! other adapters (a wired keypad, a test harness) can inject them
//! directly through [`GateService::handle_command`].
//!
//! [`GateService::handle_command`]: super::service::GateService::handle_command

/// Actions the outside world can request from the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCommand {
    /// Toggle between fully-closed and fully-open.
    SwitchState,
    /// Manual dead-man open: energize while held.
    OpenPressed,
    OpenReleased,
    /// Manual dead-man close.
    ClosePressed,
    CloseReleased,
    /// Emergency stop: outputs dead, state machine reset.
    PowerOff,
}
