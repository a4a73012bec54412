//! Session Layer
//!
//! The orchestrator and the plumbing around it: the event queue, per-kind
//! timers and the render commands pushed to the touchscreen.
//!
//! ## Module Structure
//!
//! - `events`: Queue and event type feeding the orchestrator
//! - `timers`: Cancellable one-shot and repeating timers, one per kind
//! - `render`: Render commands and presentation surfaces
//! - `orchestrator`: The session state machine

pub mod events;
pub mod orchestrator;
pub mod render;
pub mod timers;

use thiserror::Error;

use crate::game::quiz::QuizError;
use crate::hardware::HardwareError;
use crate::store::StoreError;

pub use events::{channel, EventReceiver, EventSender, KioskEvent};
pub use orchestrator::Orchestrator;
pub use render::{AudioCue, BroadcastSurface, RecordingSurface, RenderCommand, ScreenId, Surface};
pub use timers::{TimerKind, Timers};

/// Faults the orchestrator absorbs. None of them ends the process.
#[derive(Debug, Error)]
pub enum SessionError {
    /// LED or button layer failed; the session carries on without it.
    #[error("Hardware fault: {0}")]
    HardwareFault(#[from] HardwareError),

    /// Leaderboard could not be written; the session carries on from memory.
    ///
    /// Holds the rendered [`StoreError`] so the fault can cross back from the
    /// blocking pool inside a [`KioskEvent`].
    #[error("Persistence fault: {0}")]
    PersistenceFault(String),

    /// Question bank too small for the configured rounds.
    #[error("Insufficient data: need {needed} questions, bank has {available}")]
    InsufficientData {
        /// Rounds configured.
        needed: usize,
        /// Questions available.
        available: usize,
    },

    /// Rejected player input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        SessionError::PersistenceFault(err.to_string())
    }
}

impl From<QuizError> for SessionError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::InsufficientQuestions { needed, available } => {
                SessionError::InsufficientData { needed, available }
            }
            other => SessionError::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_error_classification() {
        let err: SessionError = QuizError::InsufficientQuestions { needed: 4, available: 1 }.into();
        assert!(matches!(err, SessionError::InsufficientData { needed: 4, available: 1 }));

        let err: SessionError = QuizError::InvalidOption(7).into();
        assert!(matches!(err, SessionError::InvalidInput(_)));
    }

    #[test]
    fn test_store_error_keeps_path() {
        let err: SessionError = StoreError::Io {
            path: "/var/lib/stand-game/leaderboard.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        match err {
            SessionError::PersistenceFault(msg) => assert!(msg.contains("leaderboard.json")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
