//! Session State
//!
//! The single player session: current phase, score, per-game progress, guard
//! flags and debounce trackers. Owned and mutated only by the orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::KioskConfig;
use crate::core::debounce::Debouncer;
use crate::game::agility::AgilityState;
use crate::game::name::{NameBuffer, NameKey};
use crate::game::quiz::QuizState;

/// Which mini-game an instructions screen introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Reaction game on the physical buttons.
    Agility,
    /// Multiple-choice quiz on the touchscreen.
    Quiz,
}

/// Node of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Attract screen, waiting for a player.
    #[default]
    Welcome,
    /// Rules for the next mini-game.
    Instructions(GameKind),
    /// 3-2-1 before the agility run.
    AgilityCountdown,
    /// Agility run in progress.
    AgilityRunning,
    /// Quiz section in progress.
    QuizRunning,
    /// Player types their name.
    ScoreEntry,
    /// Today's leaderboard.
    Leaderboard,
    /// Idle LED attract loop.
    Idle,
}

impl Phase {
    /// A player session is underway.
    pub fn is_session_active(self) -> bool {
        !matches!(self, Phase::Welcome | Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Welcome => f.write_str("WELCOME"),
            Phase::Instructions(GameKind::Agility) => f.write_str("INSTRUCTIONS(agility)"),
            Phase::Instructions(GameKind::Quiz) => f.write_str("INSTRUCTIONS(quiz)"),
            Phase::AgilityCountdown => f.write_str("AGILITY_COUNTDOWN"),
            Phase::AgilityRunning => f.write_str("AGILITY_RUNNING"),
            Phase::QuizRunning => f.write_str("QUIZ_RUNNING"),
            Phase::ScoreEntry => f.write_str("SCORE_ENTRY"),
            Phase::Leaderboard => f.write_str("LEADERBOARD"),
            Phase::Idle => f.write_str("IDLE"),
        }
    }
}

/// Everything the orchestrator knows about the current session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current phase.
    pub phase: Phase,
    /// Running total for this session.
    pub score: u32,
    /// Points earned in the agility run.
    pub agility_score: u32,
    /// Agility progress.
    pub agility: AgilityState,
    /// Quiz progress.
    pub quiz: QuizState,
    /// A countdown sequence is in flight.
    pub countdown_active: bool,
    /// The idle LED loop is running.
    pub idle_mode: bool,
    /// Name being typed on the score screen.
    pub name: NameBuffer,
    /// Identifier of the current player session.
    pub session_id: Option<Uuid>,
    /// Physical button debounce.
    pub button_debounce: Debouncer<usize>,
    /// On-screen keyboard debounce.
    pub key_debounce: Debouncer<NameKey>,
}

impl SessionState {
    /// Fresh state on the welcome screen.
    pub fn new(config: &KioskConfig) -> Self {
        Self {
            phase: Phase::Welcome,
            score: 0,
            agility_score: 0,
            agility: AgilityState::default(),
            quiz: QuizState::default(),
            countdown_active: false,
            idle_mode: false,
            name: NameBuffer::new(config.name_entry.max_len),
            session_id: None,
            button_debounce: Debouncer::new(config.agility.button_debounce()),
            key_debounce: Debouncer::new(config.name_entry.key_debounce()),
        }
    }

    /// Start a new player session: zero the score and every round.
    pub fn begin_session(&mut self, session_id: Uuid) {
        self.score = 0;
        self.agility_score = 0;
        self.agility = AgilityState::default();
        self.quiz.reset();
        self.countdown_active = false;
        self.name.clear();
        self.session_id = Some(session_id);
        self.button_debounce.reset();
        self.key_debounce.reset();
    }

    /// Drop all in-progress round state (abort back to welcome).
    pub fn discard_rounds(&mut self) {
        self.agility = AgilityState::default();
        self.quiz.reset();
        self.countdown_active = false;
        self.name.clear();
        self.session_id = None;
    }

    /// Short hex prefix of the session id for log lines.
    pub fn session_tag(&self) -> String {
        self.session_id
            .map(|id| hex::encode(&id.as_bytes()[..4]))
            .unwrap_or_else(|| "--------".to_string())
    }
}
