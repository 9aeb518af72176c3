//! Remote-control gesture classifier.
//!
//! The IR receiver only reports "code seen, and whether it was an
//! auto-repeat" — there is no key-up. A release therefore has to be
//! inferred from silence: every press or repeat (re)arms a one-shot
//! deadline, and if no further repeat refreshes it in time the button is
//! considered released.
//!
//! | Raw event              | Gesture   | Deadline re-armed to        |
//! |------------------------|-----------|-----------------------------|
//! | matching, not repeat   | `Press`   | now + `press_release_ms`    |
//! | matching, repeat       | `Hold`    | now + `hold_release_ms`     |
//! | deadline expires       | `Release` | none                        |
//!
//! At most one deadline is pending per button; re-arming replaces the
//! previous one, so a press followed by repeats yields exactly one
//! `Release` after the stream goes quiet.

use crate::config::CodeList;
use crate::time::deadline_reached;

/// Classified gesture for one logical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Press,
    Hold,
    Release,
}

/// Per-button classifier. One instance per logical button; feed it every
/// raw receive event via [`on_receive`] and poll [`tick`] for inferred
/// releases.
///
/// [`on_receive`]: ButtonClassifier::on_receive
/// [`tick`]: ButtonClassifier::tick
#[derive(Debug, Clone)]
pub struct ButtonClassifier {
    codes: CodeList,
    press_release_ms: u32,
    hold_release_ms: u32,
    holding: bool,
    release_deadline_ms: Option<u32>,
}

impl ButtonClassifier {
    pub fn new(codes: CodeList, press_release_ms: u32, hold_release_ms: u32) -> Self {
        Self {
            codes,
            press_release_ms,
            hold_release_ms,
            holding: false,
            release_deadline_ms: None,
        }
    }

    /// True while the physical button is believed depressed.
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Whether this button claims the given raw code (aliases included).
    pub fn matches(&self, code: u32) -> bool {
        self.codes.contains(&code)
    }

    /// Classify one raw receive event. Non-matching codes yield nothing.
    pub fn on_receive(&mut self, code: u32, repeat: bool, now_ms: u32) -> Option<Gesture> {
        if !self.matches(code) {
            return None;
        }

        // One pending deadline per button: drop the old one before arming.
        self.release_deadline_ms.take();

        if repeat {
            self.holding = true;
            self.release_deadline_ms = Some(now_ms.wrapping_add(self.hold_release_ms));
            Some(Gesture::Hold)
        } else {
            self.holding = false;
            self.release_deadline_ms = Some(now_ms.wrapping_add(self.press_release_ms));
            Some(Gesture::Press)
        }
    }

    /// Fire the inferred release once the deadline lapses unrefreshed.
    pub fn tick(&mut self, now_ms: u32) -> Option<Gesture> {
        match self.release_deadline_ms {
            Some(at) if deadline_reached(now_ms, at) => {
                self.release_deadline_ms = None;
                self.holding = false;
                Some(Gesture::Release)
            }
            _ => None,
        }
    }
}
