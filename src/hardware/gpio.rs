//! Raspberry Pi GPIO Backend
//!
//! Buttons are pull-up inputs that read low when pressed; relays switch the
//! LEDs and are usually wired active-low.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use tracing::{info, warn};

use super::{ButtonCallback, Hardware, HardwareError};
use crate::config::HardwareConfig;

/// Contact-level glitch filter. Player-level debounce lives in the orchestrator.
const EDGE_DEBOUNCE: Duration = Duration::from_millis(20);

struct Pins {
    buttons: Vec<InputPin>,
    relays: Vec<OutputPin>,
    shut_down: bool,
}

/// Buttons and relays on the GPIO header.
pub struct GpioHardware {
    pins: Mutex<Pins>,
    active_low: bool,
    count: usize,
}

impl GpioHardware {
    /// Claim every pin in `config`.
    pub fn open(config: &HardwareConfig) -> Result<Self, HardwareError> {
        let gpio = Gpio::new().map_err(|e| HardwareError::Gpio(e.to_string()))?;

        let buttons = config
            .button_pins
            .iter()
            .map(|&pin| gpio.get(pin).map(|p| p.into_input_pullup()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| HardwareError::Gpio(e.to_string()))?;

        let mut relays = config
            .relay_pins
            .iter()
            .map(|&pin| gpio.get(pin).map(|p| p.into_output()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| HardwareError::Gpio(e.to_string()))?;

        for relay in &mut relays {
            if config.relays_active_low {
                relay.set_high();
            } else {
                relay.set_low();
            }
        }

        info!(
            "GPIO ready: {} buttons on {:?}, {} relays on {:?} (active-{})",
            buttons.len(),
            config.button_pins,
            relays.len(),
            config.relay_pins,
            if config.relays_active_low { "low" } else { "high" },
        );

        Ok(Self {
            count: relays.len(),
            pins: Mutex::new(Pins {
                buttons,
                relays,
                shut_down: false,
            }),
            active_low: config.relays_active_low,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Pins> {
        self.pins.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Hardware for GpioHardware {
    fn led_count(&self) -> usize {
        self.count
    }

    fn set_button_callback(&self, callback: ButtonCallback) -> Result<(), HardwareError> {
        let mut pins = self.lock();
        if pins.shut_down {
            return Err(HardwareError::ShutDown);
        }

        let shared: Arc<dyn Fn(usize) + Send + Sync> = Arc::from(callback);
        for (index, button) in pins.buttons.iter_mut().enumerate() {
            let cb = shared.clone();
            button
                .set_async_interrupt(Trigger::FallingEdge, Some(EDGE_DEBOUNCE), move |_event| {
                    cb(index)
                })
                .map_err(|e| HardwareError::Gpio(e.to_string()))?;
        }
        Ok(())
    }

    fn set_led(&self, index: usize, on: bool) -> Result<(), HardwareError> {
        let mut pins = self.lock();
        if pins.shut_down {
            return Err(HardwareError::ShutDown);
        }
        let count = pins.relays.len();
        let relay = pins
            .relays
            .get_mut(index)
            .ok_or(HardwareError::LedOutOfRange { index, count })?;

        // Drive low to energise an active-low relay
        if on == self.active_low {
            relay.set_low();
        } else {
            relay.set_high();
        }
        Ok(())
    }

    fn shutdown(&self) {
        let mut pins = self.lock();
        if pins.shut_down {
            return;
        }

        for (index, button) in pins.buttons.iter_mut().enumerate() {
            if let Err(e) = button.clear_async_interrupt() {
                warn!("Could not release button {}: {}", index, e);
            }
        }

        let active_low = self.active_low;
        for relay in pins.relays.iter_mut() {
            if active_low {
                relay.set_high();
            } else {
                relay.set_low();
            }
        }

        pins.buttons.clear();
        pins.relays.clear();
        pins.shut_down = true;
        info!("GPIO resources released");
    }
}
