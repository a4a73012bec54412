//! Agility Round Logic
//!
//! One LED lights, the player hits the matching button, the next LED lights.
//! Wrong buttons cost nothing: the player just has to find the right one.

use std::time::Duration;
use tokio::time::Instant;

use crate::core::rng::DeterministicRng;

/// Progress of the agility mini-game.
#[derive(Debug, Clone, Default)]
pub struct AgilityState {
    /// Targets still to hit.
    pub buttons_remaining: u32,
    /// Currently lit LED (valid whenever `in_progress`).
    pub target_index: Option<usize>,
    /// Monotonic start of the run.
    pub start_time: Option<Instant>,
    /// A target is lit and waiting for its button.
    pub in_progress: bool,
}

/// What a button press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// No target was waiting.
    Ignored,
    /// Wrong button; nothing changes.
    Miss,
    /// Right button, more targets to come.
    Hit {
        /// LED that was lit.
        index: usize,
        /// Targets left.
        remaining: u32,
    },
    /// Right button on the last target.
    Completed {
        /// LED that was lit.
        index: usize,
        /// Time since the run started.
        elapsed: Duration,
    },
}

impl AgilityState {
    /// Arm a new run of `buttons` targets, starting the clock at `now`.
    pub fn begin(&mut self, buttons: u32, now: Instant) {
        self.buttons_remaining = buttons;
        self.target_index = None;
        self.start_time = Some(now);
        self.in_progress = false;
    }

    /// Pick the next target uniformly from `[0, led_count)`; repeats allowed.
    ///
    /// Returns the LED to light, or `None` when there are no LEDs or no
    /// targets left.
    pub fn trigger_next(&mut self, rng: &mut DeterministicRng, led_count: usize) -> Option<usize> {
        if led_count == 0 || self.buttons_remaining == 0 {
            return None;
        }
        let index = rng.next_index(led_count);
        self.target_index = Some(index);
        self.in_progress = true;
        Some(index)
    }

    /// Apply a (debounced) button press.
    pub fn press(&mut self, index: usize, now: Instant) -> PressOutcome {
        if !self.in_progress {
            return PressOutcome::Ignored;
        }
        if self.target_index != Some(index) {
            return PressOutcome::Miss;
        }

        self.in_progress = false;
        self.target_index = None;
        self.buttons_remaining = self.buttons_remaining.saturating_sub(1);

        if self.buttons_remaining > 0 {
            PressOutcome::Hit {
                index,
                remaining: self.buttons_remaining,
            }
        } else {
            PressOutcome::Completed {
                index,
                elapsed: self.elapsed(now),
            }
        }
    }

    /// Abandon the run. Returns the LED that was still lit, if any.
    pub fn abort(&mut self) -> Option<usize> {
        let lit = if self.in_progress { self.target_index } else { None };
        *self = Self::default();
        lit
    }

    /// Time since the run started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.start_time
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}

/// Agility score: `max(0, max_score - elapsed_ms * penalty_per_ms)`.
///
/// Elapsed time is truncated to whole milliseconds; the result is floored.
pub fn agility_score(elapsed: Duration, max_score: u32, penalty_per_ms: f64) -> u32 {
    let elapsed_ms = elapsed.as_millis() as f64;
    let score = max_score as f64 - elapsed_ms * penalty_per_ms;
    if score <= 0.0 {
        0
    } else {
        score.floor() as u32
    }
}

/// HUD text for an elapsed duration, e.g. `"4.27s"`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
