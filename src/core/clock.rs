//! Wall Clock
//!
//! Calendar time for leaderboard timestamps and the "today" filter.
//! Elapsed-time measurement uses the monotonic `tokio::time::Instant` instead.

use chrono::{DateTime, FixedOffset, Local};

/// Source of the current local date and time.
pub trait WallClock: Send + Sync {
    /// Current local time with its UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
