//! Hardware Interface
//!
//! Indexed LEDs (driven through relays) and indexed buttons with a single
//! press callback. The orchestrator only sees the [`Hardware`] trait.
//!
//! Button callbacks may run on a driver thread. They must only forward the
//! index into the orchestrator's event queue.

pub mod simulated;

#[cfg(feature = "gpio")]
pub mod gpio;

use thiserror::Error;

pub use simulated::SimulatedHardware;

#[cfg(feature = "gpio")]
pub use gpio::GpioHardware;

/// Callback receiving the index of a pressed button.
pub type ButtonCallback = Box<dyn Fn(usize) + Send + Sync + 'static>;

/// Hardware errors.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// LED index outside `0..led_count`.
    #[error("LED index {index} out of range (have {count})")]
    LedOutOfRange {
        /// Requested index.
        index: usize,
        /// LEDs available.
        count: usize,
    },

    /// Hardware already released.
    #[error("Hardware has been shut down")]
    ShutDown,

    /// Pin driver failure.
    #[error("GPIO error: {0}")]
    Gpio(String),
}

/// Buttons and LEDs.
pub trait Hardware: Send + Sync {
    /// Number of button/LED pairs.
    fn led_count(&self) -> usize;

    /// Register the press callback for every button, replacing any previous one.
    fn set_button_callback(&self, callback: ButtonCallback) -> Result<(), HardwareError>;

    /// Switch LED `index` on or off.
    fn set_led(&self, index: usize, on: bool) -> Result<(), HardwareError>;

    /// Switch every LED off.
    fn all_leds_off(&self) -> Result<(), HardwareError> {
        for index in 0..self.led_count() {
            self.set_led(index, false)?;
        }
        Ok(())
    }

    /// Release the pins. Safe to call more than once.
    fn shutdown(&self);
}
