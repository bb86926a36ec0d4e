//! Button registry: the fixed table binding physical inputs to actions.
//!
//! The table is built once at startup and never mutated. Each entry binds a
//! logical input to a primary action, an optional long-press action, and the
//! repeat/long-press timing threshold. Entry order only decides which button
//! is evaluated first inside a cycle; it is not observable in the resolved
//! outcome (simultaneous presses resolve to [`Action::Invalid`] regardless).

use std::time::Duration;

/// Time a button must stay held before its repeat/long-press behavior kicks
/// in, and the interval between repeats for buttons that repeat.
pub const BUTTON_THROTTLE: Duration = Duration::from_millis(300);

/// Logical action a poll cycle can resolve to.
///
/// `RepeatSinglePress` is a configuration sentinel: placed in a descriptor's
/// `long_press_action` slot it means "keep firing the primary action while
/// held" rather than naming a distinct action. It is never emitted as a
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
// The page/track placeholders are not bound by the default layout; they
// stay until the report map grows a keyboard usage page.
#[allow(dead_code)]
pub enum Action {
    None,
    Invalid,
    RepeatSinglePress,
    Reset,
    VolumeUp,
    VolumeDown,
    Pause,
    PageDown,
    PageUp,
    DoublePageUp,
    Next,
    Previous,
}

impl Action {
    /// True for the two bookkeeping values that never leave the engine.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Action::None | Action::Invalid)
    }
}

/// Logical index of a physical input. The hardware layer maps this to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputId(pub u8);

/// One entry of the button table. Immutable after startup.
#[derive(Debug, Clone, Copy)]
pub struct ButtonDescriptor {
    pub input: InputId,
    /// Fired on the press edge. Must be a real action, never `None`.
    pub action: Action,
    /// Fired once the hold exceeds `repeat_throttle`. `None` means the
    /// button does nothing further while held.
    pub long_press_action: Option<Action>,
    /// Allows the fired hold action to repeat every `repeat_throttle`.
    pub can_repeat: bool,
    pub repeat_throttle: Duration,
}

/// Default layout of the remote, mirroring the physical button placement:
/// two volume buttons that repeat while held, a play/pause button, an extra
/// button bound to previous-track, and a recessed maintenance button that
/// unpairs and restarts the device.
pub static DEFAULT_LAYOUT: [ButtonDescriptor; 5] = [
    ButtonDescriptor {
        input: InputId(0),
        action: Action::VolumeDown,
        long_press_action: Some(Action::RepeatSinglePress),
        can_repeat: false,
        repeat_throttle: BUTTON_THROTTLE,
    },
    ButtonDescriptor {
        input: InputId(1),
        action: Action::VolumeUp,
        long_press_action: Some(Action::RepeatSinglePress),
        can_repeat: false,
        repeat_throttle: BUTTON_THROTTLE,
    },
    ButtonDescriptor {
        input: InputId(2),
        action: Action::Pause,
        long_press_action: None,
        can_repeat: false,
        repeat_throttle: BUTTON_THROTTLE,
    },
    ButtonDescriptor {
        input: InputId(3),
        action: Action::Previous,
        long_press_action: None,
        can_repeat: false,
        repeat_throttle: BUTTON_THROTTLE,
    },
    ButtonDescriptor {
        input: InputId(4),
        action: Action::Reset,
        long_press_action: None,
        can_repeat: false,
        repeat_throttle: BUTTON_THROTTLE,
    },
];

/// Startup check of a button table. A bad table is fatal: there is no way to
/// recover from a button that can never fire or fires a bookkeeping value.
pub fn validate(layout: &[ButtonDescriptor]) -> anyhow::Result<()> {
    for (i, desc) in layout.iter().enumerate() {
        match desc.action {
            Action::None | Action::Invalid | Action::RepeatSinglePress => {
                anyhow::bail!(
                    "button {} binds unusable primary action {:?}",
                    i,
                    desc.action
                );
            }
            _ => {}
        }
        if let Some(lp) = desc.long_press_action {
            if matches!(lp, Action::None | Action::Invalid) {
                anyhow::bail!("button {} binds unusable long-press action {:?}", i, lp);
            }
        }
        if layout[..i].iter().any(|d| d.input == desc.input) {
            anyhow::bail!("input {:?} bound twice", desc.input);
        }
    }
    Ok(())
}

/// Startup check that every input id in `layout` maps to one of
/// `input_count` wired physical inputs. A button with no binding could
/// never fire, so a short bank is fatal, not a silently dead button.
pub fn validate_bindings(layout: &[ButtonDescriptor], input_count: usize) -> anyhow::Result<()> {
    for desc in layout {
        if desc.input.0 as usize >= input_count {
            anyhow::bail!(
                "input {:?} has no physical binding (only {} inputs wired)",
                desc.input,
                input_count
            );
        }
    }
    Ok(())
}
