//! Per-cycle action resolution.
//!
//! Every poll cycle samples the whole button set once and reduces it to a
//! single [`Action`]. The rules, in order per pressed button:
//!
//! 1. If nothing was pressed in the previous cycle (a rising edge across the
//!    set), the primary action fires immediately.
//! 2. Once the hold exceeds the button's throttle, either the primary action
//!    repeats (repeat-configured buttons) or the long-press action fires
//!    once per hold.
//! 3. Two or more buttons contributing in the same cycle resolve to
//!    [`Action::Invalid`] and nothing fires — multi-press is a conflict,
//!    not a chord. The action timestamp still advances so a conflict cannot
//!    retroactively unlock a repeat or long-press race.
//!
//! The engine is deliberately free of hardware: inputs arrive through
//! [`InputSource`] and time arrives as a plain uptime value, so every timing
//! scenario is testable on a host.

use std::time::Duration;

use crate::registry::{Action, ButtonDescriptor, InputId};

/// Source of the current electrical state of the buttons. One read per
/// button per cycle; any debouncing is the implementor's concern.
pub trait InputSource {
    fn is_pressed(&mut self, input: InputId) -> bool;
}

/// State carried across cycles. Exclusively owned by the loop thread.
#[derive(Debug, Clone, Copy)]
struct CycleState {
    /// Uptime at which the last action fired (or degraded to a conflict).
    last_action_at: Duration,
    /// Whether any button was down in the previous cycle.
    any_pressed: bool,
    /// Set once a distinct long-press action has fired during the current
    /// hold; cleared on the next press edge. A single flag covers the whole
    /// set, since overlapping holds degrade to conflicts anyway.
    long_press_fired: bool,
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    /// Liveness signal for the indicator LED, independent of `action`.
    pub any_pressed: bool,
}

/// The resolution state machine. Create once, call [`resolve`](Self::resolve)
/// every cycle forever.
pub struct Engine {
    state: CycleState,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            state: CycleState {
                last_action_at: Duration::ZERO,
                any_pressed: false,
                long_press_fired: false,
            },
        }
    }

    /// Run one cycle: sample every button in `layout` and reduce the
    /// contributions to a single action.
    pub fn resolve<S: InputSource>(
        &mut self,
        layout: &[ButtonDescriptor],
        inputs: &mut S,
        now: Duration,
    ) -> Resolution {
        let mut action = Action::None;
        let mut any_pressed = false;
        // Every button is evaluated against the state as of cycle entry;
        // writes land after the reduction. A button that mutated the
        // timestamp or the long-press flag mid-loop would zero out the next
        // button's contribution and sneak a single action past the conflict
        // rule, making evaluation order observable.
        let last_action_at = self.state.last_action_at;
        let long_press_fired = self.state.long_press_fired;
        let mut fire_long_press = false;
        let mut rearm_long_press = false;

        for desc in layout {
            if !inputs.is_pressed(desc.input) {
                continue;
            }
            any_pressed = true;

            let mut contribution = Action::None;
            if !self.state.any_pressed {
                // Rising edge across the set: fire immediately and re-arm
                // the long-press for this hold.
                contribution = desc.action;
                rearm_long_press = true;
            } else if now.saturating_sub(last_action_at) > desc.repeat_throttle {
                match desc.long_press_action {
                    Some(Action::RepeatSinglePress) => contribution = desc.action,
                    Some(long_press) => {
                        if !long_press_fired {
                            contribution = long_press;
                            if !desc.can_repeat {
                                fire_long_press = true;
                            }
                        }
                    }
                    None if desc.can_repeat => contribution = desc.action,
                    None => {}
                }
            }

            if contribution != Action::None {
                action = if action == Action::None {
                    contribution
                } else {
                    Action::Invalid
                };
            }
        }

        // Edge and over-threshold cycles are mutually exclusive (an edge
        // requires the previous cycle to be all-released), so at most one
        // of these applies.
        if rearm_long_press {
            self.state.long_press_fired = false;
        }
        if fire_long_press {
            self.state.long_press_fired = true;
        }
        if action != Action::None {
            // Refreshed on conflicts too, so a chord cannot retroactively
            // unlock a repeat or long-press the moment one button is
            // released.
            self.state.last_action_at = now;
        }
        self.state.any_pressed = any_pressed;
        Resolution {
            action,
            any_pressed,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
