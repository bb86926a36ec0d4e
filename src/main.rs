//! hogkey - button core of a BLE HID-over-GATT media remote
//!
//! Every 50 ms cycle the remote:
//! 1. Samples the electrical state of every physical button
//! 2. Resolves at most one logical action (press edge, timed repeat, or
//!    long press; simultaneous presses are a conflict and resolve nothing)
//! 3. Encodes the action as a one-byte media-key report and sends a
//!    press/release notification pair over the transport
//!
//! GATT service registration, notification delivery, and pairing live in
//! the transport layer; this crate only drives its notify entry point.

mod engine;
#[cfg(target_os = "espidf")]
mod esp;
mod registry;
mod report;
mod service;

use log::info;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_hal::gpio::IOPin;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::log::EspLogger;

    // Initialize ESP-IDF
    esp_idf_sys::link_patches();
    EspLogger::initialize_default();

    info!("hogkey v{} starting", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // Devkit wiring, in registry order: vol-down, vol-up, pause, extra,
    // maintenance. All buttons to ground, pull-ups internal.
    let buttons = esp::Buttons::new(
        vec![
            pins.gpio4.downgrade(),
            pins.gpio5.downgrade(),
            pins.gpio6.downgrade(),
            pins.gpio7.downgrade(),
            pins.gpio8.downgrade(),
        ],
        &registry::DEFAULT_LAYOUT,
    )?;
    let led = esp::ActionLed::new(pins.gpio2.downgrade())?;
    info!("buttons and LED configured");

    // Owned here, raised by the GATT transport when a peer subscribes to
    // input reports. Forced on until that layer is wired in.
    let buttons_active = AtomicBool::new(true);

    let mut remote = service::MediaRemote::new(
        &registry::DEFAULT_LAYOUT,
        buttons,
        report::LogSink,
        led,
        esp::SystemReset,
    )?;

    info!("entering button loop");
    loop {
        remote.poll_cycle(esp::uptime(), buttons_active.load(Ordering::Relaxed));
        esp_idf_hal::delay::FreeRtos::delay_ms(service::CYCLE_PERIOD.as_millis() as u32);
    }
}

/// Host build: run a short scripted press sequence against the real engine
/// and emitter, with the clock fabricated on the 50 ms grid. Useful for
/// eyeballing the decision logic without flashing.
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::engine::InputSource;
    use crate::registry::{Action, InputId};
    use crate::service::{Indicator, ResetControl};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    struct ScriptedButtons {
        frames: Vec<[bool; 5]>,
        cycle: Rc<Cell<usize>>,
    }

    impl InputSource for ScriptedButtons {
        fn is_pressed(&mut self, input: InputId) -> bool {
            self.frames
                .get(self.cycle.get())
                .map(|frame| frame[input.0 as usize])
                .unwrap_or(false)
        }
    }

    struct SilentLed;

    impl Indicator for SilentLed {
        fn set_active(&mut self, _on: bool) {}
    }

    struct ExitReset;

    impl ResetControl for ExitReset {
        fn unpair_all(&mut self) {
            info!("(script) unpair all peers");
        }

        fn restart(&mut self) -> ! {
            info!("(script) hard restart");
            std::process::exit(0)
        }
    }

    let mut frames: Vec<[bool; 5]> = Vec::new();
    // Hold volume-down for half a second: edge fire plus one repeat.
    frames.extend(std::iter::repeat([true, false, false, false, false]).take(10));
    frames.push([false; 5]);
    // Tap play/pause.
    frames.push([false, false, true, false, false]);
    frames.push([false; 5]);
    // Chord both volume buttons: suppressed as a conflict.
    frames.push([true, true, false, false, false]);
    frames.push([false; 5]);

    // The scripted frames carry five inputs, same as the device bank.
    registry::validate_bindings(&registry::DEFAULT_LAYOUT, 5)?;

    let cycles = frames.len();
    let cycle = Rc::new(Cell::new(0));
    let mut remote = service::MediaRemote::new(
        &registry::DEFAULT_LAYOUT,
        ScriptedButtons {
            frames,
            cycle: cycle.clone(),
        },
        report::LogSink,
        SilentLed,
        ExitReset,
    )?;

    for n in 0..cycles {
        cycle.set(n);
        let now = service::CYCLE_PERIOD * n as u32;
        match remote.poll_cycle(now, true) {
            Action::Invalid => info!("t={:>4} ms  conflict suppressed", now.as_millis()),
            action if action.is_resolved() => {
                info!("t={:>4} ms  {:?}", now.as_millis(), action)
            }
            _ => {}
        }
    }

    Ok(())
}
