//! Daily Leaderboard
//!
//! Only today's entries are shown, best score first.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// One submitted score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Upper-cased player name.
    #[serde(rename = "name")]
    pub player_name: String,
    /// Final score.
    pub score: u32,
    /// ISO-8601 submission time.
    pub timestamp: String,
}

impl ScoreEntry {
    /// Create an entry stamped with `at`.
    pub fn new(player_name: impl Into<String>, score: u32, at: DateTime<FixedOffset>) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// Calendar date of the submission.
    ///
    /// Accepts RFC 3339 (date in the entry's own offset), naive ISO-8601
    /// date-times, and bare dates. `None` for anything else.
    pub fn date(&self) -> Option<NaiveDate> {
        let ts = self.timestamp.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.date());
        }
        NaiveDate::parse_from_str(ts.get(..10)?, "%Y-%m-%d").ok()
    }
}

/// What the leaderboard screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardView {
    /// Today's best entries, highest first.
    pub entries: Vec<ScoreEntry>,
    /// Name of the player who just submitted.
    pub highlight_name: Option<String>,
    /// That player's entry made the list.
    pub player_in_top: bool,
}

/// Entries dated `today`, sorted by score descending (ties keep file order),
/// truncated to `limit`.
pub fn todays_top(entries: &[ScoreEntry], today: NaiveDate, limit: usize) -> Vec<ScoreEntry> {
    let mut todays: Vec<ScoreEntry> = entries
        .iter()
        .filter(|e| e.date() == Some(today))
        .cloned()
        .collect();
    todays.sort_by(|a, b| b.score.cmp(&a.score));
    todays.truncate(limit);
    todays
}

/// Build the screen model, flagging whether `player` made today's top list.
pub fn build_view(
    entries: &[ScoreEntry],
    today: NaiveDate,
    limit: usize,
    player: Option<&ScoreEntry>,
) -> LeaderboardView {
    let top = todays_top(entries, today, limit);
    let player_in_top = player.map(|p| top.contains(p)).unwrap_or(false);

    LeaderboardView {
        entries: top,
        highlight_name: player.map(|p| p.player_name.clone()),
        player_in_top,
    }
}
