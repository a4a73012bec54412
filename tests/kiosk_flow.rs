//! End-to-end sessions through the public API: simulated buttons, a recording
//! surface, real JSON files in a scratch directory and a paused tokio clock.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use stand_game::core::clock::FixedClock;
use stand_game::game::leaderboard::{LeaderboardView, ScoreEntry};
use stand_game::game::name::{KeySource, NameKey};
use stand_game::game::quiz::Question;
use stand_game::session::{channel, EventReceiver, RecordingSurface, RenderCommand, ScreenId};
use stand_game::{GameKind, KioskConfig, KioskEvent, Orchestrator, Phase, ScoreStore, SimulatedHardware};

const NOW: &str = "2026-10-19T12:00:00+02:00";

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stand-game-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn bank(size: usize) -> Vec<Question> {
    (0..size)
        .map(|i| {
            Question::new(
                format!("Question {i}?"),
                [
                    format!("Wrong A{i}"),
                    format!("Right {i}"),
                    format!("Wrong B{i}"),
                    format!("Wrong C{i}"),
                ],
                format!("Right {i}"),
            )
            .unwrap()
        })
        .collect()
}

struct Kiosk {
    orch: Orchestrator,
    rx: EventReceiver,
    hw: SimulatedHardware,
    surface: RecordingSurface,
    store: ScoreStore,
    config: KioskConfig,
}

impl Kiosk {
    fn new(config: KioskConfig, questions: &[Question], store: ScoreStore) -> Self {
        let body = serde_json::json!({ "questions": questions });
        std::fs::write(store.questions_path(), body.to_string()).unwrap();

        let hw = SimulatedHardware::new(config.hardware.led_count());
        let surface = RecordingSurface::new();
        let clock = FixedClock(DateTime::parse_from_rfc3339(NOW).unwrap());
        let (tx, rx) = channel();
        let mut orch = Orchestrator::new(
            config.clone(),
            Arc::new(hw.clone()),
            Arc::new(surface.clone()),
            store.clone(),
            Arc::new(clock),
            tx,
        )
        .with_rng_seed(7);
        orch.start();
        Kiosk { orch, rx, hw, surface, store, config }
    }

    fn standard(questions: &[Question]) -> Self {
        let dir = scratch_dir();
        let store = ScoreStore::new(dir.join("questions.json"), dir.join("leaderboard.json"));
        let mut config = KioskConfig::default();
        config.agility.buttons_count = 4;
        config.quiz.rounds = 3;
        Self::new(config, questions, store)
    }

    async fn pump(&mut self) {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        while let Ok(event) = self.rx.try_recv() {
            self.orch.handle(event);
        }
    }

    async fn advance(&mut self, ms: u64) {
        tokio::time::advance(Duration::from_millis(ms)).await;
        self.pump().await;
    }

    async fn play_agility(&mut self) {
        self.orch.handle(KioskEvent::Proceed);
        self.orch.handle(KioskEvent::Proceed);
        self.advance(1_000).await;
        self.advance(1_000).await;
        self.advance(300).await;
        assert_eq!(self.orch.phase(), Phase::AgilityRunning);

        let window = self.config.agility.button_debounce_ms + 1;
        for press in 0..self.config.agility.buttons_count {
            if press > 0 {
                self.advance(window).await;
            }
            let lit = self.hw.lit_leds();
            assert_eq!(lit.len(), 1);
            assert!(self.hw.press(lit[0]));
            self.pump().await;
        }
    }

    fn last_question(&self) -> [String; 4] {
        self.surface
            .commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                RenderCommand::QuizQuestion { options, .. } => Some(options.clone()),
                _ => None,
            })
            .unwrap()
    }

    fn answer(&mut self, right: bool) {
        let options = self.last_question();
        let correct = options.iter().position(|o| o.starts_with("Right")).unwrap();
        let pick = if right { correct } else { (correct + 1) % 4 };
        self.orch.handle(KioskEvent::Answer { option: pick });
    }

    fn type_name(&mut self, text: &str) {
        for c in text.chars() {
            self.orch.handle(KioskEvent::key(NameKey::Char(c), KeySource::Physical));
        }
    }

    fn submit(&mut self) {
        self.orch.handle(KioskEvent::key(NameKey::Submit, KeySource::Physical));
    }

    /// Submit, then feed events until the leaderboard write reports back.
    async fn submit_and_save(&mut self) {
        self.submit();
        assert!(self.orch.save_pending());
        while self.orch.save_pending() {
            let event = self.rx.recv().await.unwrap();
            self.orch.handle(event);
        }
    }

    fn last_leaderboard(&self) -> LeaderboardView {
        self.surface
            .commands()
            .iter()
            .rev()
            .find_map(|c| match c {
                RenderCommand::Leaderboard { view } => Some(view.clone()),
                _ => None,
            })
            .unwrap()
    }
}

#[tokio::test(start_paused = true)]
async fn agility_run_scores_elapsed_time() {
    let mut kiosk = Kiosk::standard(&bank(5));
    kiosk.play_agility().await;

    assert_eq!(kiosk.orch.phase(), Phase::Instructions(GameKind::Quiz));
    // Four presses, three debounce-safe gaps of 301 ms, 1 point per ms
    let expected = 20_000 - 3 * 301;
    assert_eq!(kiosk.orch.state().agility_score, expected);
    assert_eq!(kiosk.orch.state().score, expected);
    assert!(kiosk.hw.lit_leds().is_empty());
}

#[tokio::test(start_paused = true)]
async fn full_session_lands_on_leaderboard() {
    let mut kiosk = Kiosk::standard(&bank(6));
    kiosk.play_agility().await;
    let agility = kiosk.orch.state().agility_score;

    kiosk.orch.handle(KioskEvent::Proceed);
    assert_eq!(kiosk.orch.phase(), Phase::QuizRunning);

    for right in [true, false, true] {
        kiosk.answer(right);
        kiosk.advance(2_500).await;
    }
    assert_eq!(kiosk.orch.phase(), Phase::ScoreEntry);

    let final_score = agility + 2 * 500;
    assert_eq!(kiosk.orch.state().score, final_score);

    kiosk.type_name("abc");
    kiosk.submit_and_save().await;
    assert_eq!(kiosk.orch.phase(), Phase::Leaderboard);

    let saved = kiosk.store.load_leaderboard();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].player_name, "ABC");
    assert_eq!(saved[0].score, final_score);

    let view = kiosk.last_leaderboard();
    assert_eq!(view.highlight_name.as_deref(), Some("ABC"));
    assert!(view.player_in_top);

    kiosk.advance(20_000).await;
    assert_eq!(kiosk.orch.phase(), Phase::Welcome);
    assert_eq!(kiosk.surface.current_screen(), Some(ScreenId::Welcome));
}

#[tokio::test(start_paused = true)]
async fn blank_name_is_rejected() {
    let mut kiosk = Kiosk::standard(&bank(1));
    kiosk.play_agility().await;
    // Bank too small: straight to score entry
    kiosk.orch.handle(KioskEvent::Proceed);
    assert_eq!(kiosk.orch.phase(), Phase::ScoreEntry);

    kiosk.submit();
    kiosk.type_name("   ");
    kiosk.submit();

    assert_eq!(kiosk.orch.phase(), Phase::ScoreEntry);
    assert!(!kiosk.store.leaderboard_path().exists());
}

#[tokio::test(start_paused = true)]
async fn leaderboard_shows_only_today() {
    let dir = scratch_dir();
    let store = ScoreStore::new(dir.join("questions.json"), dir.join("leaderboard.json"));
    let yesterday = DateTime::parse_from_rfc3339("2026-10-18T20:00:00+02:00").unwrap();
    let earlier_today = DateTime::parse_from_rfc3339("2026-10-19T09:00:00+02:00").unwrap();
    store
        .save_leaderboard(&[
            ScoreEntry::new("CHAMP", 99_999, yesterday),
            ScoreEntry::new("EARLY", 10, earlier_today),
        ])
        .unwrap();

    let mut config = KioskConfig::default();
    config.agility.buttons_count = 1;
    config.quiz.rounds = 1;
    let mut kiosk = Kiosk::new(config, &bank(1), store);

    kiosk.play_agility().await;
    kiosk.orch.handle(KioskEvent::Proceed);
    kiosk.answer(true);
    kiosk.advance(2_500).await;
    kiosk.type_name("zed");
    kiosk.submit_and_save().await;

    let view = kiosk.last_leaderboard();
    let names: Vec<&str> = view.entries.iter().map(|e| e.player_name.as_str()).collect();
    assert_eq!(names, vec!["ZED", "EARLY"]);
    assert_eq!(kiosk.store.load_leaderboard().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_save_still_shows_leaderboard() {
    let dir = scratch_dir();
    // A directory where the leaderboard file should be makes the rename fail
    let blocked = dir.join("leaderboard.json");
    std::fs::create_dir_all(blocked.join("occupied")).unwrap();
    let store = ScoreStore::new(dir.join("questions.json"), blocked);

    let mut config = KioskConfig::default();
    config.agility.buttons_count = 1;
    config.quiz.rounds = 1;
    let mut kiosk = Kiosk::new(config, &bank(2), store);

    kiosk.play_agility().await;
    kiosk.orch.handle(KioskEvent::Proceed);
    kiosk.answer(false);
    kiosk.advance(2_500).await;
    kiosk.type_name("x");
    kiosk.submit_and_save().await;

    assert_eq!(kiosk.orch.phase(), Phase::Leaderboard);
    assert_eq!(kiosk.last_leaderboard().entries.len(), 1);

    kiosk.advance(20_000).await;
    assert_eq!(kiosk.orch.phase(), Phase::Welcome);
}

#[tokio::test(start_paused = true)]
async fn button_bounce_counts_once() {
    let mut kiosk = Kiosk::standard(&bank(5));
    kiosk.orch.handle(KioskEvent::Proceed);
    kiosk.orch.handle(KioskEvent::Proceed);
    kiosk.advance(1_000).await;
    kiosk.advance(1_000).await;
    kiosk.advance(300).await;

    let target = kiosk.hw.lit_leds()[0];
    kiosk.hw.press(target);
    kiosk.advance(50).await;
    kiosk.hw.press(target);
    kiosk.advance(50).await;
    kiosk.hw.press(target);
    kiosk.pump().await;

    assert_eq!(kiosk.orch.state().agility.buttons_remaining, 3);
}
