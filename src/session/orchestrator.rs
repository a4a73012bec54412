//! Session Orchestrator
//!
//! The kiosk's state machine. It owns the [`SessionState`] and is the only
//! thing that mutates it. Hardware presses, touchscreen taps and timer expiries
//! all arrive as [`KioskEvent`]s on one queue and are handled one at a time.
//!
//! ## Main path
//!
//! ```text
//! WELCOME -> INSTRUCTIONS(agility) -> AGILITY_COUNTDOWN -> AGILITY_RUNNING
//!         -> INSTRUCTIONS(quiz) -> QUIZ_RUNNING -> SCORE_ENTRY -> LEADERBOARD
//!         -> WELCOME (-> IDLE)
//! ```
//!
//! Every side exit lands on WELCOME, which cancels all timers and switches
//! every LED off.
//!
//! File I/O never runs on the queue. The question bank is read once before
//! the first event and re-read on the blocking pool at every session start;
//! leaderboard writes go to the blocking pool and report back with
//! [`KioskEvent::ScoreSaved`].

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::KioskConfig;
use crate::core::clock::WallClock;
use crate::core::rng::DeterministicRng;
use crate::game::agility::{agility_score, format_elapsed, PressOutcome};
use crate::game::leaderboard::{build_view, ScoreEntry};
use crate::game::name::{KeySource, NameKey};
use crate::game::quiz::{AnswerOutcome, Question};
use crate::game::state::{GameKind, Phase, SessionState};
use crate::hardware::Hardware;
use crate::session::events::{EventReceiver, EventSender, KioskEvent};
use crate::session::render::{AudioCue, RenderCommand, ScreenId, Surface};
use crate::session::timers::{TimerKind, Timers};
use crate::session::SessionError;
use crate::store::ScoreStore;

/// HUD refresh period while the agility clock runs.
const HUD_REFRESH: std::time::Duration = std::time::Duration::from_millis(100);

/// Numeral shown first in the countdown.
const COUNTDOWN_FROM: u32 = 3;

/// Drives one kiosk.
pub struct Orchestrator {
    config: KioskConfig,
    state: SessionState,
    hardware: Arc<dyn Hardware>,
    surface: Arc<dyn Surface>,
    store: ScoreStore,
    clock: Arc<dyn WallClock>,
    timers: Timers,
    tx: EventSender,
    rng: DeterministicRng,
    fixed_seed: Option<u64>,
    /// Numeral currently on screen during the countdown.
    countdown_value: u32,
    /// LED lit by the idle chase.
    idle_lit: Option<usize>,
    /// Question bank the next quiz samples from.
    bank: Vec<Question>,
    /// A leaderboard write is in flight for the current score screen.
    saving: bool,
    shut_down: bool,
}

impl Orchestrator {
    /// Orchestrator posting its own timer events to `tx`.
    pub fn new(
        config: KioskConfig,
        hardware: Arc<dyn Hardware>,
        surface: Arc<dyn Surface>,
        store: ScoreStore,
        clock: Arc<dyn WallClock>,
        tx: EventSender,
    ) -> Self {
        Self {
            state: SessionState::new(&config),
            config,
            hardware,
            surface,
            store,
            clock,
            timers: Timers::new(tx.clone()),
            tx,
            rng: DeterministicRng::new(0),
            fixed_seed: None,
            countdown_value: 0,
            idle_lit: None,
            bank: Vec::new(),
            saving: false,
            shut_down: false,
        }
    }

    /// Use `seed` for every session instead of a per-session seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.fixed_seed = Some(seed);
        self.rng = DeterministicRng::new(seed);
        self
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Active configuration.
    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    /// Whether a timer of `kind` is pending.
    pub fn timer_pending(&self, kind: TimerKind) -> bool {
        self.timers.is_pending(kind)
    }

    /// A submitted score is still being written.
    pub fn save_pending(&self) -> bool {
        self.saving
    }

    /// `Shutdown` has been handled.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Route button presses into the queue and show the welcome screen.
    pub fn start(&mut self) {
        let tx = self.tx.clone();
        let registered = self.hardware.set_button_callback(Box::new(move |index| {
            // Only forward; the orchestrator task does the rest
            let _ = tx.send(KioskEvent::button(index));
        }));
        if let Err(e) = registered {
            self.absorb(e.into());
        }
        // Nothing is queued yet, so a direct read stalls no event
        self.bank = self.store.load_questions();
        info!(
            "Kiosk starting: {} LEDs, {} agility targets, {} quiz rounds",
            self.hardware.led_count(),
            self.config.agility.buttons_count,
            self.config.quiz.rounds
        );
        self.enter_welcome();
    }

    /// Handle events until `Shutdown`.
    pub async fn run(mut self, mut rx: EventReceiver) {
        self.start();
        while let Some(event) = rx.recv().await {
            self.handle(event);
            if self.shut_down {
                break;
            }
        }
        self.shutdown();
    }

    /// Apply one event.
    pub fn handle(&mut self, event: KioskEvent) {
        if self.shut_down {
            return;
        }
        match event {
            KioskEvent::ButtonPressed { index, at } => self.on_button(index, at),
            KioskEvent::Proceed => self.on_proceed(),
            KioskEvent::Answer { option } => self.on_answer(option),
            KioskEvent::NameKey { key, source, at } => self.on_name_key(key, source, at),
            KioskEvent::ReturnToWelcome => {
                info!("[{}] Return to welcome requested", self.state.session_tag());
                self.enter_welcome();
            }
            KioskEvent::SkipAgility => self.skip_agility(),
            KioskEvent::Timer { kind, generation } => self.on_timer(kind, generation),
            KioskEvent::QuestionsLoaded { bank } => {
                debug!("Question bank refreshed: {} questions", bank.len());
                self.bank = bank;
            }
            KioskEvent::ScoreSaved { session, entry, entries, error } => {
                self.on_score_saved(session, entry, entries, error)
            }
            KioskEvent::Shutdown => self.shutdown(),
        }
    }

    /// Cancel every timer, switch the LEDs off and release the hardware.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.timers.cancel_all();
        self.idle_lit = None;
        self.state.idle_mode = false;
        self.all_leds_off();
        self.hardware.shutdown();
        self.shut_down = true;
        info!("Kiosk shut down");
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    fn on_button(&mut self, index: usize, at: Instant) {
        match self.state.phase {
            Phase::AgilityRunning => self.agility_press(index, at),
            Phase::Idle => {
                debug!("Button {} woke the kiosk", index);
                self.enter_welcome();
            }
            Phase::Welcome => {
                // Activity keeps the welcome screen from going idle
                self.timers
                    .schedule(TimerKind::WelcomeIdle, self.config.timings.welcome_idle_after());
            }
            phase => debug!("Button {} ignored in {}", index, phase),
        }
    }

    fn on_proceed(&mut self) {
        match self.state.phase {
            Phase::Welcome | Phase::Idle => self.begin_session(),
            Phase::Instructions(GameKind::Agility) => self.start_countdown(),
            Phase::Instructions(GameKind::Quiz) => self.start_quiz(),
            phase => debug!("Proceed ignored in {}", phase),
        }
    }

    fn on_answer(&mut self, option: usize) {
        if self.state.phase != Phase::QuizRunning {
            debug!("Answer {} ignored in {}", option, self.state.phase);
            return;
        }
        match self.state.quiz.answer(option) {
            Ok(outcome) => {
                self.timers.cancel(TimerKind::QuizQuestion);
                self.timers
                    .schedule(TimerKind::QuizInactivity, self.config.timings.quiz_inactivity_timeout());
                if outcome.correct {
                    self.state.score += self.config.quiz.points_per_correct;
                }
                debug!(
                    "[{}] Round {} answered {}",
                    self.state.session_tag(),
                    self.state.quiz.round_index,
                    if outcome.correct { "right" } else { "wrong" }
                );
                self.show_feedback(outcome);
            }
            Err(e) => self.absorb(e.into()),
        }
    }

    fn on_name_key(&mut self, key: NameKey, source: KeySource, at: Instant) {
        if self.state.phase != Phase::ScoreEntry {
            debug!("Key {:?} ignored in {}", key, self.state.phase);
            return;
        }
        if self.saving {
            debug!("Key {:?} ignored while saving", key);
            return;
        }
        if source == KeySource::Virtual && !self.state.key_debounce.accept(key, at) {
            debug!("Key {:?} debounced", key);
            return;
        }
        self.timers
            .schedule(TimerKind::ScoreEntryTimeout, self.config.timings.score_entry_timeout());

        let changed = match key {
            NameKey::Char(c) => self.state.name.push(c),
            NameKey::Backspace => self.state.name.backspace(),
            NameKey::Submit => {
                self.submit_name();
                return;
            }
        };
        if changed {
            self.render_score_entry();
        }
    }

    fn on_timer(&mut self, kind: TimerKind, generation: u64) {
        if !self.timers.is_current(kind, generation) {
            debug!("Stale {:?} timer dropped", kind);
            return;
        }
        if !matches!(kind, TimerKind::AgilityHud | TimerKind::IdleStep) {
            self.timers.consume(kind);
        }

        let phase = self.state.phase;
        match (kind, phase) {
            (TimerKind::InstructionsTimeout, Phase::Instructions(_)) => {
                info!("[{}] Instructions left untouched", self.state.session_tag());
                self.enter_welcome();
            }
            (TimerKind::Countdown, Phase::AgilityCountdown) => self.countdown_tick(),
            (TimerKind::AgilityHud, Phase::AgilityRunning) => self.render_agility_hud(),
            (TimerKind::QuizQuestion, Phase::QuizRunning) => {
                if let Some(outcome) = self.state.quiz.expire() {
                    debug!("[{}] Question timed out", self.state.session_tag());
                    self.show_feedback(outcome);
                }
            }
            (TimerKind::QuizAdvance, Phase::QuizRunning) => {
                if self.state.quiz.is_complete() {
                    self.finish_quiz();
                } else {
                    self.present_question();
                }
            }
            (TimerKind::QuizInactivity, Phase::QuizRunning) => {
                info!("[{}] Quiz abandoned", self.state.session_tag());
                self.enter_welcome();
            }
            (TimerKind::ScoreEntryTimeout, Phase::ScoreEntry) => {
                info!("[{}] Score entry abandoned, nothing saved", self.state.session_tag());
                self.enter_welcome();
            }
            (TimerKind::LeaderboardTimeout, Phase::Leaderboard) => self.enter_welcome(),
            (TimerKind::WelcomeIdle, Phase::Welcome) => self.enter_idle(),
            (TimerKind::IdleStep, Phase::Idle) => self.idle_step(),
            (kind, phase) => debug!("{:?} timer ignored in {}", kind, phase),
        }
    }

    // =========================================================================
    // WELCOME / IDLE
    // =========================================================================

    fn enter_welcome(&mut self) {
        self.timers.cancel_all();
        self.saving = false;
        self.state.idle_mode = false;
        self.idle_lit = None;
        self.all_leds_off();
        self.state.discard_rounds();
        self.set_phase(Phase::Welcome);
        self.render(RenderCommand::SetScreen { screen: ScreenId::Welcome });
        self.timers
            .schedule(TimerKind::WelcomeIdle, self.config.timings.welcome_idle_after());
    }

    fn enter_idle(&mut self) {
        if self.state.idle_mode {
            return;
        }
        self.state.idle_mode = true;
        self.idle_lit = None;
        self.set_phase(Phase::Idle);
        self.render(RenderCommand::SetScreen { screen: ScreenId::Idle });
        self.timers
            .schedule_repeating(TimerKind::IdleStep, self.config.timings.idle_step());
    }

    fn idle_step(&mut self) {
        let count = self.hardware.led_count();
        if !self.state.idle_mode || count == 0 {
            return;
        }
        let next = self.idle_lit.map(|i| (i + 1) % count).unwrap_or(0);
        if let Some(prev) = self.idle_lit {
            self.led(prev, false);
        }
        self.led(next, true);
        self.idle_lit = Some(next);
    }

    /// Stop the chase loop and leave every LED dark.
    fn stop_idle(&mut self) {
        self.timers.cancel(TimerKind::IdleStep);
        self.state.idle_mode = false;
        self.idle_lit = None;
        self.all_leds_off();
    }

    fn begin_session(&mut self) {
        self.stop_idle();
        self.timers.cancel(TimerKind::WelcomeIdle);

        let id = Uuid::new_v4();
        self.state.begin_session(id);
        self.rng = match self.fixed_seed {
            Some(seed) => DeterministicRng::new(seed),
            None => {
                let nanos = self.clock.now().timestamp_nanos_opt().unwrap_or_default();
                DeterministicRng::for_session(id.as_bytes(), nanos)
            }
        };
        info!("[{}] Session started", self.state.session_tag());
        self.refresh_bank();
        self.enter_instructions(GameKind::Agility);
    }

    /// Re-read the question bank off the queue. Edits to the file show up
    /// from the next quiz on.
    fn refresh_bank(&self) {
        let store = self.store.clone();
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(KioskEvent::QuestionsLoaded { bank: store.load_questions() });
        });
    }

    fn enter_instructions(&mut self, game: GameKind) {
        self.set_phase(Phase::Instructions(game));
        let (title, body) = match game {
            GameKind::Agility => (
                "Agility",
                format!(
                    "Press the lit button as fast as you can. {} targets, every millisecond counts.",
                    self.config.agility.buttons_count
                ),
            ),
            GameKind::Quiz => (
                "Quiz",
                format!(
                    "{} questions, {} points for every right answer.",
                    self.config.quiz.rounds, self.config.quiz.points_per_correct
                ),
            ),
        };
        self.render(RenderCommand::SetScreen { screen: ScreenId::Instructions });
        self.render(RenderCommand::Instructions {
            title: title.to_string(),
            body,
            button_label: "Start".to_string(),
        });
        self.timers
            .schedule(TimerKind::InstructionsTimeout, self.config.timings.instructions_timeout());
    }

    // =========================================================================
    // AGILITY
    // =========================================================================

    /// Run the 3-2-1 sequence, then start the agility clock.
    ///
    /// Only from the agility instructions, and a no-op while a countdown is
    /// already in flight.
    fn start_countdown(&mut self) {
        if self.state.countdown_active {
            debug!("Countdown already running");
            return;
        }
        if self.state.phase != Phase::Instructions(GameKind::Agility) {
            debug!("Countdown refused in {}", self.state.phase);
            return;
        }
        self.timers.cancel(TimerKind::InstructionsTimeout);
        self.timers.cancel(TimerKind::Countdown);
        self.stop_idle();
        self.state.countdown_active = true;
        self.set_phase(Phase::AgilityCountdown);

        self.render(RenderCommand::SetScreen { screen: ScreenId::Agility });
        self.render(RenderCommand::CountdownReset);
        self.render(RenderCommand::Cue { cue: AudioCue::Start });
        self.countdown_value = COUNTDOWN_FROM;
        self.render(RenderCommand::Countdown { value: COUNTDOWN_FROM });
        self.timers
            .schedule(TimerKind::Countdown, self.config.timings.countdown_step());
    }

    fn countdown_tick(&mut self) {
        if !self.state.countdown_active {
            return;
        }
        if self.countdown_value > 1 {
            self.countdown_value -= 1;
            self.render(RenderCommand::Countdown { value: self.countdown_value });
            let delay = if self.countdown_value > 1 {
                self.config.timings.countdown_step()
            } else {
                self.config.timings.countdown_final_gap()
            };
            self.timers.schedule(TimerKind::Countdown, delay);
        } else {
            self.state.countdown_active = false;
            self.countdown_value = 0;
            self.start_agility();
        }
    }

    fn start_agility(&mut self) {
        self.stop_idle();
        self.state.button_debounce.reset();
        self.state
            .agility
            .begin(self.config.agility.buttons_count, Instant::now());
        self.set_phase(Phase::AgilityRunning);
        self.render_agility_hud();
        self.timers.schedule_repeating(TimerKind::AgilityHud, HUD_REFRESH);
        self.trigger_next_led();
    }

    fn trigger_next_led(&mut self) {
        let count = self.hardware.led_count();
        match self.state.agility.trigger_next(&mut self.rng, count) {
            Some(index) => {
                debug!("Target LED {}", index);
                self.led(index, true);
            }
            None => warn!("No LED available for the next target"),
        }
    }

    fn agility_press(&mut self, index: usize, at: Instant) {
        if !self.state.button_debounce.accept(index, at) {
            debug!("Button {} debounced", index);
            return;
        }
        match self.state.agility.press(index, at) {
            PressOutcome::Ignored => debug!("Button {} with no target lit", index),
            PressOutcome::Miss => debug!("Button {} missed", index),
            PressOutcome::Hit { index, remaining } => {
                self.led(index, false);
                debug!("Hit {}, {} to go", index, remaining);
                self.render_agility_hud();
                self.trigger_next_led();
            }
            PressOutcome::Completed { index, elapsed } => {
                self.led(index, false);
                self.timers.cancel(TimerKind::AgilityHud);

                let agility = &self.config.agility;
                let points = agility_score(elapsed, agility.max_score, agility.penalty_per_ms);
                self.state.agility_score = points;
                self.state.score += points;
                self.render(RenderCommand::AgilityHud {
                    remaining: 0,
                    elapsed_text: format_elapsed(elapsed),
                });
                info!(
                    "[{}] Agility done in {} for {} points",
                    self.state.session_tag(),
                    format_elapsed(elapsed),
                    points
                );
                self.enter_instructions(GameKind::Quiz);
            }
        }
    }

    fn skip_agility(&mut self) {
        if self.state.phase != Phase::AgilityRunning {
            debug!("Skip ignored in {}", self.state.phase);
            return;
        }
        if let Some(lit) = self.state.agility.abort() {
            self.led(lit, false);
        }
        self.timers.cancel(TimerKind::AgilityHud);
        self.state.agility_score = 0;
        info!("[{}] Agility skipped by operator", self.state.session_tag());
        self.enter_instructions(GameKind::Quiz);
    }

    fn render_agility_hud(&mut self) {
        let elapsed = self.state.agility.elapsed(Instant::now());
        self.render(RenderCommand::AgilityHud {
            remaining: self.state.agility.buttons_remaining,
            elapsed_text: format_elapsed(elapsed),
        });
    }

    // =========================================================================
    // QUIZ
    // =========================================================================

    fn start_quiz(&mut self) {
        self.timers.cancel(TimerKind::InstructionsTimeout);
        if let Err(e) = self.state.quiz.begin(&self.bank, self.config.quiz.rounds, &mut self.rng) {
            self.absorb(e.into());
            self.enter_score_entry();
            return;
        }

        self.set_phase(Phase::QuizRunning);
        self.render(RenderCommand::SetScreen { screen: ScreenId::Quiz });
        self.timers
            .schedule(TimerKind::QuizInactivity, self.config.timings.quiz_inactivity_timeout());
        self.present_question();
    }

    fn present_question(&mut self) {
        let Some(question) = self.state.quiz.present_next().cloned() else {
            self.finish_quiz();
            return;
        };
        self.render(RenderCommand::QuizQuestion {
            text: question.text,
            options: question.options,
            round: self.state.quiz.round_index + 1,
            rounds_total: self.state.quiz.rounds_total,
        });
        self.timers
            .schedule(TimerKind::QuizQuestion, self.config.quiz.question_time_limit());
    }

    fn show_feedback(&mut self, outcome: AnswerOutcome) {
        let cue = if outcome.correct { AudioCue::Correct } else { AudioCue::Wrong };
        self.render(RenderCommand::QuizFeedback {
            correct: outcome.correct,
            correct_text: outcome.correct_text,
            selected_option: outcome.selected,
        });
        self.render(RenderCommand::Cue { cue });
        self.timers
            .schedule(TimerKind::QuizAdvance, self.config.quiz.feedback_delay());
    }

    fn finish_quiz(&mut self) {
        self.timers.cancel(TimerKind::QuizQuestion);
        self.timers.cancel(TimerKind::QuizInactivity);
        self.timers.cancel(TimerKind::QuizAdvance);
        info!(
            "[{}] Quiz done: {}/{} right, total {}",
            self.state.session_tag(),
            self.state.quiz.correct_answers,
            self.state.quiz.rounds_total,
            self.state.score
        );
        self.enter_score_entry();
    }

    // =========================================================================
    // SCORE ENTRY / LEADERBOARD
    // =========================================================================

    fn enter_score_entry(&mut self) {
        self.saving = false;
        self.state.name.clear();
        self.state.key_debounce.reset();
        self.set_phase(Phase::ScoreEntry);
        self.render(RenderCommand::SetScreen { screen: ScreenId::Score });
        self.render_score_entry();
        self.timers
            .schedule(TimerKind::ScoreEntryTimeout, self.config.timings.score_entry_timeout());
    }

    fn render_score_entry(&mut self) {
        self.render(RenderCommand::ScoreEntry {
            current_score: self.state.score,
            name_buffer: self.state.name.as_str().to_string(),
        });
    }

    fn submit_name(&mut self) {
        let Some(name) = self.state.name.submittable() else {
            self.absorb(SessionError::InvalidInput("empty name".to_string()));
            return;
        };
        self.timers.cancel(TimerKind::ScoreEntryTimeout);

        let entry = ScoreEntry::new(name, self.state.score, self.clock.now());
        self.render(RenderCommand::Cue { cue: AudioCue::Submit });
        info!(
            "[{}] {} submitted {} points",
            self.state.session_tag(),
            entry.player_name,
            entry.score
        );

        self.saving = true;
        self.persist_score(entry);
    }

    /// Write `entry` on the blocking pool. A failed write still reports the
    /// readable leaderboard plus `entry` so the player sees a board.
    fn persist_score(&self, entry: ScoreEntry) {
        let store = self.store.clone();
        let tx = self.tx.clone();
        let session = self.state.session_id;
        tokio::task::spawn_blocking(move || {
            let (entries, error) = match store.append_score(entry.clone()) {
                Ok(all) => (all, None),
                Err(e) => {
                    let mut all = store.load_leaderboard();
                    all.push(entry.clone());
                    (all, Some(e.to_string()))
                }
            };
            let _ = tx.send(KioskEvent::ScoreSaved { session, entry, entries, error });
        });
    }

    fn on_score_saved(
        &mut self,
        session: Option<Uuid>,
        entry: ScoreEntry,
        entries: Vec<ScoreEntry>,
        error: Option<String>,
    ) {
        if let Some(e) = error {
            self.absorb(SessionError::PersistenceFault(e));
        }
        let current = self.saving
            && self.state.phase == Phase::ScoreEntry
            && session == self.state.session_id;
        if !current {
            debug!("Save for {} finished after its screen closed", entry.player_name);
            return;
        }
        self.saving = false;
        self.show_leaderboard(&entries, &entry);
    }

    fn show_leaderboard(&mut self, entries: &[ScoreEntry], player: &ScoreEntry) {
        let today = self.clock.now().date_naive();
        let view = build_view(entries, today, self.config.leaderboard.top_n, Some(player));
        if view.player_in_top {
            info!("[{}] {} made today's top {}", self.state.session_tag(), player.player_name, self.config.leaderboard.top_n);
        }
        self.set_phase(Phase::Leaderboard);
        self.render(RenderCommand::SetScreen { screen: ScreenId::Leaderboard });
        self.render(RenderCommand::Leaderboard { view });
        self.timers
            .schedule(TimerKind::LeaderboardTimeout, self.config.timings.leaderboard_timeout());
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn set_phase(&mut self, next: Phase) {
        let prev = self.state.phase;
        self.state.phase = next;
        if prev != next {
            info!("[{}] {} -> {}", self.state.session_tag(), prev, next);
        }
    }

    fn render(&self, command: RenderCommand) {
        self.surface.render(command);
    }

    fn led(&self, index: usize, on: bool) {
        if let Err(e) = self.hardware.set_led(index, on) {
            self.absorb(e.into());
        }
    }

    fn all_leds_off(&self) {
        if let Err(e) = self.hardware.all_leds_off() {
            self.absorb(e.into());
        }
    }

    /// Log a fault and carry on.
    fn absorb(&self, err: SessionError) {
        let tag = self.state.session_tag();
        match &err {
            SessionError::HardwareFault(_) => warn!("[{}] {}", tag, err),
            SessionError::PersistenceFault(_) => error!("[{}] {}", tag, err),
            SessionError::InsufficientData { .. } => warn!("[{}] {}, skipping to score entry", tag, err),
            SessionError::InvalidInput(_) => debug!("[{}] {}", tag, err),
        }
    }
}
