//! The read → resolve → apply step of the control loop.
//!
//! [`MediaRemote`] owns the button table, the resolution engine, the report
//! emitter, and the four hardware collaborators, and advances everything one
//! cycle at a time. Resolution stays pure inside [`crate::engine`]; side
//! effects (LED, notifications, reset) happen only here.

use std::time::Duration;

use log::{debug, warn};

use crate::engine::{Engine, InputSource};
use crate::registry::{self, Action, ButtonDescriptor};
use crate::report::{NotifySink, ReportEmitter};

/// Inter-cycle sleep. Bounds both input latency and CPU usage.
pub const CYCLE_PERIOD: Duration = Duration::from_millis(50);

/// "Some button is down" liveness LED.
pub trait Indicator {
    fn set_active(&mut self, on: bool);
}

/// Unpair-and-restart primitive. `restart` never returns.
pub trait ResetControl {
    fn unpair_all(&mut self);
    fn restart(&mut self) -> !;
}

/// The assembled remote. Generic over its collaborators so the whole cycle
/// runs against fakes in tests and against real peripherals on the device.
pub struct MediaRemote<'a, I, S, L, R> {
    layout: &'a [ButtonDescriptor],
    engine: Engine,
    emitter: ReportEmitter,
    inputs: I,
    sink: S,
    indicator: L,
    reset: R,
}

impl<'a, I, S, L, R> MediaRemote<'a, I, S, L, R>
where
    I: InputSource,
    S: NotifySink,
    L: Indicator,
    R: ResetControl,
{
    /// Assemble the remote. A malformed button table is startup-fatal.
    pub fn new(
        layout: &'a [ButtonDescriptor],
        inputs: I,
        sink: S,
        indicator: L,
        reset: R,
    ) -> anyhow::Result<Self> {
        registry::validate(layout)?;
        Ok(Self {
            layout,
            engine: Engine::new(),
            emitter: ReportEmitter::new(),
            inputs,
            sink,
            indicator,
            reset,
        })
    }

    /// Run one cycle at uptime `now`.
    ///
    /// `active` is the externally owned flag the transport raises once a
    /// peer subscribes to input reports. While it is down, reports and the
    /// liveness LED are suppressed but the engine still advances, so no
    /// edge or hold is double-counted when the flag comes up. A resolved
    /// `Reset` is not gated: the maintenance button works regardless of
    /// link state.
    pub fn poll_cycle(&mut self, now: Duration, active: bool) -> Action {
        let resolution = self.engine.resolve(self.layout, &mut self.inputs, now);

        if active {
            self.indicator.set_active(resolution.any_pressed);
        }

        match resolution.action {
            Action::Reset => {
                warn!("maintenance reset: unpairing all peers and restarting");
                self.reset.unpair_all();
                self.reset.restart();
            }
            action if action.is_resolved() => {
                debug!("resolved {:?}", action);
                if active {
                    self.emitter.emit(&mut self.sink, action);
                }
            }
            _ => {}
        }

        resolution.action
    }
}
