//! Input Debouncing
//!
//! Drops a repeat of the same input identity inside a cooldown window.
//! One tracker per input class (physical buttons, virtual keys).

use std::time::Duration;
use tokio::time::Instant;

/// Remembers the last accepted input and when it arrived.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    window: Duration,
    last: Option<(K, Instant)>,
}

impl<K: PartialEq + Clone> Debouncer<K> {
    /// Create a tracker with the given cooldown window.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Cooldown window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide whether `key` arriving at `at` is a fresh input.
    ///
    /// Accepted inputs become the new reference point; dropped ones do not
    /// extend the window.
    pub fn accept(&mut self, key: K, at: Instant) -> bool {
        if let Some((last_key, last_at)) = &self.last {
            if *last_key == key && at.saturating_duration_since(*last_at) < self.window {
                return false;
            }
        }
        self.last = Some((key, at));
        true
    }

    /// Forget the last accepted input.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_same_key_inside_window_dropped() {
        let mut d = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(d.accept(3usize, t0));
        assert!(!d.accept(3, t0 + Duration::from_millis(120)));
        assert!(!d.accept(3, t0 + Duration::from_millis(299)));
        assert!(d.accept(3, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_different_key_always_accepted() {
        let mut d = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(d.accept(1usize, t0));
        assert!(d.accept(2, t0 + Duration::from_millis(10)));
        // 1 is no longer the reference, so it passes too
        assert!(d.accept(1, t0 + Duration::from_millis(20)));
    }

    #[test]
    fn test_dropped_press_does_not_extend_window() {
        let mut d = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(d.accept(5usize, t0));
        assert!(!d.accept(5, t0 + Duration::from_millis(250)));
        assert!(d.accept(5, t0 + Duration::from_millis(310)));
    }

    #[test]
    fn test_reset() {
        let mut d = Debouncer::new(WINDOW);
        let t0 = Instant::now();

        assert!(d.accept('A', t0));
        d.reset();
        assert!(d.accept('A', t0));
    }

    proptest! {
        #[test]
        fn prop_bounce_burst_counts_once(offsets in proptest::collection::vec(0u64..300, 1..20)) {
            let mut d = Debouncer::new(WINDOW);
            let t0 = Instant::now();
            let mut accepted = usize::from(d.accept(7usize, t0));
            for off in offsets {
                if d.accept(7, t0 + Duration::from_millis(off)) {
                    accepted += 1;
                }
            }
            prop_assert_eq!(accepted, 1);
        }
    }
}
