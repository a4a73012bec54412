//! Game Logic Module
//!
//! Pure rules of the two mini-games and the session data they mutate.
//! Nothing in here touches hardware, timers or the screen.
//!
//! ## Module Structure
//!
//! - `state`: Session phase, score and per-game progress
//! - `agility`: Light-then-press rounds and time-based scoring
//! - `quiz`: Question sampling and answer checking
//! - `name`: Player name buffer
//! - `leaderboard`: Score entries and the daily top list

pub mod agility;
pub mod leaderboard;
pub mod name;
pub mod quiz;
pub mod state;

// Re-export key types
pub use agility::{agility_score, AgilityState, PressOutcome};
pub use leaderboard::{LeaderboardView, ScoreEntry};
pub use name::{KeySource, NameBuffer, NameKey};
pub use quiz::{quiz_score, AnswerOutcome, Question, QuizError, QuizState, OPTION_COUNT};
pub use state::{GameKind, Phase, SessionState};
