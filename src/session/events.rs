//! Orchestrator Events
//!
//! Everything that can change the session arrives as a [`KioskEvent`] on one
//! queue: hardware presses, touchscreen intents, fired timers, file I/O
//! results and shutdown.

use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::game::leaderboard::ScoreEntry;
use crate::game::name::{KeySource, NameKey};
use crate::game::quiz::Question;
use crate::session::timers::TimerKind;

/// Sender half of the orchestrator queue.
pub type EventSender = mpsc::UnboundedSender<KioskEvent>;

/// Receiver half of the orchestrator queue.
pub type EventReceiver = mpsc::UnboundedReceiver<KioskEvent>;

/// Input to the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum KioskEvent {
    /// Physical button pressed. `at` is sampled in the hardware callback.
    ButtonPressed { index: usize, at: Instant },
    /// Start / proceed tap on the touchscreen.
    Proceed,
    /// Quiz answer tapped.
    Answer { option: usize },
    /// Key typed on the score screen.
    NameKey {
        key: NameKey,
        source: KeySource,
        at: Instant,
    },
    /// Explicit navigation back to the welcome screen.
    ReturnToWelcome,
    /// Operator override: skip the agility run.
    SkipAgility,
    /// A scheduled timer fired.
    Timer { kind: TimerKind, generation: u64 },
    /// Question bank re-read on the blocking pool.
    QuestionsLoaded { bank: Vec<Question> },
    /// Leaderboard write finished on the blocking pool.
    ///
    /// `entries` is what the leaderboard screen shows: the file as written,
    /// or on failure the readable file plus `entry`.
    ScoreSaved {
        session: Option<Uuid>,
        entry: ScoreEntry,
        entries: Vec<ScoreEntry>,
        error: Option<String>,
    },
    /// Stop the kiosk and release hardware.
    Shutdown,
}

impl KioskEvent {
    /// Button press stamped now.
    pub fn button(index: usize) -> Self {
        KioskEvent::ButtonPressed {
            index,
            at: Instant::now(),
        }
    }

    /// Key press stamped now.
    pub fn key(key: NameKey, source: KeySource) -> Self {
        KioskEvent::NameKey {
            key,
            source,
            at: Instant::now(),
        }
    }
}

/// New unbounded event queue.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
