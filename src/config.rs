//! Kiosk Configuration
//!
//! Pin mapping, game mechanics, timings and file paths. Loaded from built-in
//! defaults, an optional JSON file, an optional mechanics preset and finally
//! environment overrides.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the question bank path.
pub const ENV_QUESTIONS_FILE: &str = "STAND_GAME_QUESTIONS_FILE";
/// Environment variable overriding the leaderboard path.
pub const ENV_LEADERBOARD_FILE: &str = "STAND_GAME_LEADERBOARD_FILE";
/// Environment variable overriding the UI bind address.
pub const ENV_UI_BIND: &str = "STAND_GAME_UI_BIND";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Unknown preset name.
    #[error("Unknown preset '{0}' (expected standard, quick, challenge, kids or tournament)")]
    UnknownPreset(String),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Full kiosk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// GPIO pin mapping.
    pub hardware: HardwareConfig,
    /// Agility mini-game.
    pub agility: AgilityConfig,
    /// Quiz mini-game.
    pub quiz: QuizConfig,
    /// Screen timeouts and sequences.
    pub timings: TimingConfig,
    /// Player name input.
    pub name_entry: NameEntryConfig,
    /// Leaderboard display.
    pub leaderboard: LeaderboardConfig,
    /// Data files.
    pub paths: PathsConfig,
    /// Touchscreen bridge.
    pub ui: UiConfig,
}

/// GPIO pin mapping (BCM numbering). Index `i` pairs button `i` with relay `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Button input pins.
    pub button_pins: Vec<u8>,
    /// Relay (LED) output pins.
    pub relay_pins: Vec<u8>,
    /// Relays switch on when the pin is driven low.
    pub relays_active_low: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            button_pins: vec![13, 6, 5, 2, 3, 4, 11, 9, 10, 17, 27, 22],
            relay_pins: vec![7, 8, 21, 25, 24, 23, 20, 16, 12, 18, 15, 14],
            relays_active_low: true,
        }
    }
}

impl HardwareConfig {
    /// Number of button/LED pairs.
    pub fn led_count(&self) -> usize {
        self.relay_pins.len()
    }
}

/// Agility mini-game settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgilityConfig {
    /// Targets to hit per game.
    pub buttons_count: u32,
    /// Score for an instant finish.
    pub max_score: u32,
    /// Points deducted per elapsed millisecond.
    pub penalty_per_ms: f64,
    /// Same-button cooldown (ms).
    pub button_debounce_ms: u64,
}

impl Default for AgilityConfig {
    fn default() -> Self {
        Self {
            buttons_count: 8,
            max_score: 20_000,
            penalty_per_ms: 1.0,
            button_debounce_ms: 300,
        }
    }
}

impl AgilityConfig {
    /// Same-button cooldown.
    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms)
    }
}

/// Quiz mini-game settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Questions per game.
    pub rounds: u32,
    /// Points per correct answer.
    pub points_per_correct: u32,
    /// Time allowed per question (ms).
    pub question_time_limit_ms: u64,
    /// How long answer feedback stays up (ms).
    pub feedback_delay_ms: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            rounds: 4,
            points_per_correct: 500,
            question_time_limit_ms: 15_000,
            feedback_delay_ms: 2_500,
        }
    }
}

impl QuizConfig {
    /// Time allowed per question.
    pub fn question_time_limit(&self) -> Duration {
        Duration::from_millis(self.question_time_limit_ms)
    }

    /// Feedback display time.
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

/// Screen timeouts and timed sequences (all in ms).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Instructions screen abandoned after this long.
    pub instructions_timeout_ms: u64,
    /// Quiz abandoned when no answer arrives for this long.
    pub quiz_inactivity_timeout_ms: u64,
    /// Score entry abandoned when no key arrives for this long.
    pub score_entry_timeout_ms: u64,
    /// Leaderboard returns to welcome after this long.
    pub leaderboard_timeout_ms: u64,
    /// Welcome screen drops into the idle attract loop after this long.
    pub welcome_idle_after_ms: u64,
    /// Interval between idle LED chase steps.
    pub idle_step_ms: u64,
    /// Interval between countdown numerals.
    pub countdown_step_ms: u64,
    /// Offset of gameplay start from the first numeral.
    pub countdown_start_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            instructions_timeout_ms: 30_000,
            quiz_inactivity_timeout_ms: 45_000,
            score_entry_timeout_ms: 90_000,
            leaderboard_timeout_ms: 20_000,
            welcome_idle_after_ms: 15_000,
            idle_step_ms: 250,
            countdown_step_ms: 1_000,
            countdown_start_ms: 2_300,
        }
    }
}

impl TimingConfig {
    /// Instructions inactivity timeout.
    pub fn instructions_timeout(&self) -> Duration {
        Duration::from_millis(self.instructions_timeout_ms)
    }

    /// Quiz inactivity timeout.
    pub fn quiz_inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.quiz_inactivity_timeout_ms)
    }

    /// Score entry inactivity timeout.
    pub fn score_entry_timeout(&self) -> Duration {
        Duration::from_millis(self.score_entry_timeout_ms)
    }

    /// Leaderboard auto-return timeout.
    pub fn leaderboard_timeout(&self) -> Duration {
        Duration::from_millis(self.leaderboard_timeout_ms)
    }

    /// Delay before idle mode.
    pub fn welcome_idle_after(&self) -> Duration {
        Duration::from_millis(self.welcome_idle_after_ms)
    }

    /// Idle chase step.
    pub fn idle_step(&self) -> Duration {
        Duration::from_millis(self.idle_step_ms.max(1))
    }

    /// Countdown numeral interval.
    pub fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    /// Gap between the last numeral and gameplay start.
    pub fn countdown_final_gap(&self) -> Duration {
        Duration::from_millis(
            self.countdown_start_ms
                .saturating_sub(self.countdown_step_ms.saturating_mul(2)),
        )
    }
}

/// Player name input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameEntryConfig {
    /// Maximum name length in characters.
    pub max_len: usize,
    /// Same-key cooldown for the on-screen keyboard (ms).
    pub key_debounce_ms: u64,
}

impl Default for NameEntryConfig {
    fn default() -> Self {
        Self {
            max_len: 30,
            key_debounce_ms: 150,
        }
    }
}

impl NameEntryConfig {
    /// Same-key cooldown.
    pub fn key_debounce(&self) -> Duration {
        Duration::from_millis(self.key_debounce_ms)
    }
}

/// Leaderboard display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Entries shown.
    pub top_n: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { top_n: 15 }
    }
}

/// Data file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Question bank.
    pub questions_file: PathBuf,
    /// Persisted leaderboard.
    pub leaderboard_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            questions_file: PathBuf::from("data/questions.json"),
            leaderboard_file: PathBuf::from("data/leaderboard.json"),
        }
    }
}

/// Touchscreen bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// WebSocket bind address.
    pub bind_addr: SocketAddr,
    /// Render broadcast buffer per client.
    pub broadcast_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8765)),
            broadcast_capacity: 256,
        }
    }
}

impl KioskConfig {
    /// Load defaults, then the file, then the preset, then environment overrides.
    pub fn load(path: Option<&Path>, preset: Option<Preset>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(preset) = preset {
            preset.apply(&mut config);
        }

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(ENV_QUESTIONS_FILE) {
            self.paths.questions_file = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var(ENV_LEADERBOARD_FILE) {
            self.paths.leaderboard_file = PathBuf::from(path);
        }
        if let Some(addr) = std::env::var(ENV_UI_BIND).ok().and_then(|v| v.parse().ok()) {
            self.ui.bind_addr = addr;
        }
    }

    /// Reject configurations the orchestrator cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hw = &self.hardware;
        if hw.relay_pins.is_empty() {
            return Err(ConfigError::Invalid("no relay pins configured".into()));
        }
        if hw.button_pins.len() != hw.relay_pins.len() {
            return Err(ConfigError::Invalid(format!(
                "{} button pins but {} relay pins",
                hw.button_pins.len(),
                hw.relay_pins.len()
            )));
        }
        if self.agility.buttons_count == 0 {
            return Err(ConfigError::Invalid("agility.buttons_count must be at least 1".into()));
        }
        if !self.agility.penalty_per_ms.is_finite() || self.agility.penalty_per_ms < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "agility.penalty_per_ms must be a non-negative number, got {}",
                self.agility.penalty_per_ms
            )));
        }
        if self.name_entry.max_len == 0 {
            return Err(ConfigError::Invalid("name_entry.max_len must be at least 1".into()));
        }
        if self.leaderboard.top_n == 0 {
            return Err(ConfigError::Invalid("leaderboard.top_n must be at least 1".into()));
        }
        Ok(())
    }
}

/// Game mechanics presets for different events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Default kiosk settings.
    Standard,
    /// Shorter sessions.
    Quick,
    /// Longer and harder.
    Challenge,
    /// Easy and forgiving.
    Kids,
    /// Competitive balance.
    Tournament,
}

impl Preset {
    /// All presets.
    pub const ALL: [Preset; 5] = [
        Preset::Standard,
        Preset::Quick,
        Preset::Challenge,
        Preset::Kids,
        Preset::Tournament,
    ];

    /// Overwrite the mechanics section of `config`.
    pub fn apply(self, config: &mut KioskConfig) {
        // (buttons, max score, penalty/ms, quiz rounds, points/correct)
        let (buttons, max_score, penalty, rounds, points) = match self {
            Preset::Standard => (8, 20_000, 1.0, 4, 500),
            Preset::Quick => (5, 10_000, 2.0, 2, 750),
            Preset::Challenge => (15, 30_000, 0.5, 5, 400),
            Preset::Kids => (3, 5_000, 0.1, 2, 1_000),
            Preset::Tournament => (12, 25_000, 1.5, 4, 625),
        };
        config.agility.buttons_count = buttons;
        config.agility.max_score = max_score;
        config.agility.penalty_per_ms = penalty;
        config.quiz.rounds = rounds;
        config.quiz.points_per_correct = points;
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Quick => "quick",
            Preset::Challenge => "challenge",
            Preset::Kids => "kids",
            Preset::Tournament => "tournament",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = KioskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hardware.led_count(), 12);
        assert_eq!(config.agility.max_score, 20_000);
        assert_eq!(config.quiz.rounds, 4);
        assert_eq!(config.name_entry.max_len, 30);
        assert_eq!(config.leaderboard.top_n, 15);
    }

    #[test]
    fn test_countdown_offsets() {
        let timings = TimingConfig::default();
        // Numerals at 0, +1.0s, +2.0s; gameplay at +2.3s
        assert_eq!(timings.countdown_step(), Duration::from_millis(1_000));
        assert_eq!(timings.countdown_final_gap(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: KioskConfig =
            serde_json::from_str(r#"{ "quiz": { "rounds": 2 } }"#).unwrap();
        assert_eq!(config.quiz.rounds, 2);
        assert_eq!(config.quiz.points_per_correct, 500);
        assert_eq!(config.agility.buttons_count, 8);
    }

    #[test]
    fn test_pin_mismatch_rejected() {
        let mut config = KioskConfig::default();
        config.hardware.button_pins.pop();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let mut config = KioskConfig::default();
        config.agility.penalty_per_ms = -1.0;
        assert!(config.validate().is_err());

        config.agility.penalty_per_ms = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_parse_and_apply() {
        let preset: Preset = "Quick".parse().unwrap();
        assert_eq!(preset, Preset::Quick);

        let mut config = KioskConfig::default();
        preset.apply(&mut config);
        assert_eq!(config.agility.buttons_count, 5);
        assert_eq!(config.quiz.points_per_correct, 750);
        assert!(config.validate().is_ok());

        assert!(matches!(
            "hardcore".parse::<Preset>(),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = KioskConfig::from_file(Path::new("/nonexistent/stand-game.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
