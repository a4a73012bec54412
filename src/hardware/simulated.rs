//! Simulated Hardware
//!
//! In-memory buttons and LEDs for tests, development machines and kiosks
//! running without the relay board.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::{ButtonCallback, Hardware, HardwareError};

type SharedCallback = Arc<dyn Fn(usize) + Send + Sync + 'static>;

struct Inner {
    leds: Vec<bool>,
    callback: Option<SharedCallback>,
    shut_down: bool,
    led_writes: usize,
}

/// Buttons and LEDs that exist only in memory.
///
/// Cloning shares the same board, so a test can keep a handle while the
/// orchestrator owns another.
#[derive(Clone)]
pub struct SimulatedHardware {
    inner: Arc<Mutex<Inner>>,
}

impl SimulatedHardware {
    /// Board with `count` button/LED pairs, all LEDs off.
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                leds: vec![false; count],
                callback: None,
                shut_down: false,
                led_writes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Press button `index`, invoking the registered callback on this thread.
    ///
    /// Returns false when no callback is registered or the board is shut down.
    pub fn press(&self, index: usize) -> bool {
        let callback = {
            let inner = self.lock();
            if inner.shut_down || index >= inner.leds.len() {
                return false;
            }
            inner.callback.clone()
        };
        match callback {
            Some(cb) => {
                cb(index);
                true
            }
            None => false,
        }
    }

    /// Whether LED `index` is on.
    pub fn is_lit(&self, index: usize) -> bool {
        self.lock().leds.get(index).copied().unwrap_or(false)
    }

    /// Indices of every LED currently on.
    pub fn lit_leds(&self) -> Vec<usize> {
        self.lock()
            .leds
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| i)
            .collect()
    }

    /// Total `set_led` calls that reached the board.
    pub fn led_writes(&self) -> usize {
        self.lock().led_writes
    }

    /// Whether `shutdown` has run.
    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }
}

impl Hardware for SimulatedHardware {
    fn led_count(&self) -> usize {
        self.lock().leds.len()
    }

    fn set_button_callback(&self, callback: ButtonCallback) -> Result<(), HardwareError> {
        let mut inner = self.lock();
        if inner.shut_down {
            return Err(HardwareError::ShutDown);
        }
        inner.callback = Some(Arc::from(callback));
        Ok(())
    }

    fn set_led(&self, index: usize, on: bool) -> Result<(), HardwareError> {
        let mut inner = self.lock();
        if inner.shut_down {
            return Err(HardwareError::ShutDown);
        }
        let count = inner.leds.len();
        let led = inner
            .leds
            .get_mut(index)
            .ok_or(HardwareError::LedOutOfRange { index, count })?;
        *led = on;
        inner.led_writes += 1;
        Ok(())
    }

    fn shutdown(&self) {
        let mut inner = self.lock();
        if inner.shut_down {
            return;
        }
        inner.leds.iter_mut().for_each(|led| *led = false);
        inner.callback = None;
        inner.shut_down = true;
        debug!("Simulated hardware released");
    }
}
