//! Render Commands
//!
//! The orchestrator never touches widgets. It pushes [`RenderCommand`]s to a
//! [`Surface`]; the touchscreen front end owns layout, animation and audio.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::game::leaderboard::LeaderboardView;
use crate::game::quiz::OPTION_COUNT;

/// Screens of the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    Welcome,
    Instructions,
    Agility,
    Quiz,
    Score,
    Leaderboard,
    Idle,
}

/// Sound effects for the front end to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    /// Countdown begins.
    Start,
    /// Right quiz answer.
    Correct,
    /// Wrong or missed quiz answer.
    Wrong,
    /// Name accepted.
    Submit,
}

/// A push from the orchestrator to the presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Rules screen content.
    Instructions {
        title: String,
        body: String,
        button_label: String,
    },
    /// Agility heads-up display.
    AgilityHud { remaining: u32, elapsed_text: String },
    /// Question with its four options.
    QuizQuestion {
        text: String,
        options: [String; OPTION_COUNT],
        round: u32,
        rounds_total: u32,
    },
    /// Result of the last question.
    QuizFeedback {
        correct: bool,
        correct_text: String,
        selected_option: Option<usize>,
    },
    /// Score screen with the name typed so far.
    ScoreEntry { current_score: u32, name_buffer: String },
    /// Today's leaderboard.
    Leaderboard { view: LeaderboardView },
    /// Switch to a screen.
    SetScreen { screen: ScreenId },
    /// Show a countdown numeral.
    Countdown { value: u32 },
    /// Clear countdown numerals and effects left from an earlier sequence.
    CountdownReset,
    /// Play a sound.
    Cue { cue: AudioCue },
}

/// Consumer of render commands.
pub trait Surface: Send + Sync {
    /// Apply one command. Must not block.
    fn render(&self, command: RenderCommand);
}

// =============================================================================
// BROADCAST SURFACE
// =============================================================================

/// Fans render commands out to every connected front end.
///
/// Keeps the commands issued since the last `SetScreen` so that a front end
/// connecting mid-session can rebuild the current screen.
pub struct BroadcastSurface {
    tx: broadcast::Sender<RenderCommand>,
    snapshot: Mutex<Vec<RenderCommand>>,
}

impl BroadcastSurface {
    /// Surface whose subscribers may lag by up to `capacity` commands.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            snapshot: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderCommand>> {
        self.snapshot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current screen state plus a receiver for everything after it.
    pub fn subscribe(&self) -> (Vec<RenderCommand>, broadcast::Receiver<RenderCommand>) {
        let snapshot = self.lock();
        (snapshot.clone(), self.tx.subscribe())
    }

    /// Live subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Surface for BroadcastSurface {
    fn render(&self, command: RenderCommand) {
        let mut snapshot = self.lock();
        if matches!(command, RenderCommand::SetScreen { .. }) {
            snapshot.clear();
        }
        // One-shot effects are not replayed
        if !matches!(command, RenderCommand::Cue { .. } | RenderCommand::CountdownReset) {
            snapshot.push(command.clone());
        }
        trace!("render {:?}", command);
        // No subscribers is fine
        let _ = self.tx.send(command);
    }
}

// =============================================================================
// RECORDING SURFACE
// =============================================================================

/// Keeps every command in memory. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<Vec<RenderCommand>>>,
}

impl RecordingSurface {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RenderCommand>> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every command so far.
    pub fn commands(&self) -> Vec<RenderCommand> {
        self.lock().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<RenderCommand> {
        std::mem::take(&mut *self.lock())
    }

    /// Screen from the latest `SetScreen`.
    pub fn current_screen(&self) -> Option<ScreenId> {
        self.lock().iter().rev().find_map(|c| match c {
            RenderCommand::SetScreen { screen } => Some(*screen),
            _ => None,
        })
    }

    /// Number of commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&RenderCommand) -> bool) -> usize {
        self.lock().iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn render(&self, command: RenderCommand) {
        self.lock().push(command);
    }
}
