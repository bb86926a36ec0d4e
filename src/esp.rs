//! ESP-IDF peripheral bindings.
//!
//! Buttons are wired to ground and read through internal pull-ups, so a
//! pressed button reads low. Polling keeps the loop deterministic; in a
//! power-constrained design you'd want GPIO interrupts with light sleep.

use std::time::Duration;

use esp_idf_hal::gpio::{AnyIOPin, Input, Level, Output, PinDriver, Pull};
use log::warn;

use crate::engine::InputSource;
use crate::registry::{self, ButtonDescriptor, InputId};
use crate::service::{Indicator, ResetControl};

/// The physical button bank. Index order must match the registry layout.
pub struct Buttons<'d> {
    pins: Vec<PinDriver<'d, AnyIOPin, Input>>,
}

impl<'d> Buttons<'d> {
    /// Configure one input per pin, pull-up enabled. A pin that cannot be
    /// configured, or a bank too short for `layout`, is fatal; the remote
    /// is useless with a dead button.
    pub fn new(pins: Vec<AnyIOPin>, layout: &[ButtonDescriptor]) -> anyhow::Result<Self> {
        registry::validate_bindings(layout, pins.len())?;
        let mut drivers = Vec::with_capacity(pins.len());
        for pin in pins {
            let mut driver = PinDriver::input(pin)?;
            driver.set_pull(Pull::Up)?;
            drivers.push(driver);
        }
        Ok(Self { pins: drivers })
    }
}

impl InputSource for Buttons<'_> {
    fn is_pressed(&mut self, input: InputId) -> bool {
        // Active low. Ids are range-checked against the bank at startup.
        self.pins
            .get(input.0 as usize)
            .map(|pin| pin.is_low())
            .unwrap_or(false)
    }
}

/// The "any button down" LED.
pub struct ActionLed<'d> {
    pin: PinDriver<'d, AnyIOPin, Output>,
}

impl<'d> ActionLed<'d> {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        Ok(Self {
            pin: PinDriver::output(pin)?,
        })
    }
}

impl Indicator for ActionLed<'_> {
    fn set_active(&mut self, on: bool) {
        let level = if on { Level::High } else { Level::Low };
        if self.pin.set_level(level).is_err() {
            warn!("action LED write failed");
        }
    }
}

/// Unpair-and-restart backed by the SoC reset. Bonded-peer removal is owned
/// by the BLE transport layer, which registers its teardown here once wired.
pub struct SystemReset;

impl ResetControl for SystemReset {
    fn unpair_all(&mut self) {
        warn!("dropping all bonded peers");
    }

    fn restart(&mut self) -> ! {
        unsafe { esp_idf_sys::esp_restart() };
        unreachable!("esp_restart returned");
    }
}

/// Monotonic milliseconds-resolution uptime.
pub fn uptime() -> Duration {
    Duration::from_micros(unsafe { esp_idf_sys::esp_timer_get_time() } as u64)
}
