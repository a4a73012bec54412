//! Session Timers
//!
//! One slot per [`TimerKind`]. Each slot holds the task that will post the
//! `Timer` event and a generation counter. Rescheduling or cancelling a kind
//! aborts its task and bumps the generation, so an event that was already
//! queued for the old timer is recognised as stale and dropped.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::session::events::{EventSender, KioskEvent};

/// Distinct timed behaviours of the kiosk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Instructions screen left untouched.
    InstructionsTimeout,
    /// Next step of the 3-2-1 sequence.
    Countdown,
    /// Agility HUD refresh.
    AgilityHud,
    /// Per-question time limit.
    QuizQuestion,
    /// No quiz answer for too long.
    QuizInactivity,
    /// Feedback shown long enough, move on.
    QuizAdvance,
    /// Score screen abandoned.
    ScoreEntryTimeout,
    /// Leaderboard shown long enough.
    LeaderboardTimeout,
    /// Welcome screen quiet long enough to go idle.
    WelcomeIdle,
    /// Next frame of the idle LED chase.
    IdleStep,
}

struct Slot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Timer registry owned by the orchestrator.
pub struct Timers {
    tx: EventSender,
    slots: BTreeMap<TimerKind, Slot>,
}

impl Timers {
    /// Registry posting fired timers to `tx`.
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            slots: BTreeMap::new(),
        }
    }

    /// Fire `kind` once after `delay`, replacing any pending timer of that kind.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        let generation = self.invalidate(kind);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(KioskEvent::Timer { kind, generation });
        });
        self.install(kind, handle);
        generation
    }

    /// Fire `kind` every `period`, first after one period, until cancelled.
    pub fn schedule_repeating(&mut self, kind: TimerKind, period: Duration) -> u64 {
        let generation = self.invalidate(kind);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tx.send(KioskEvent::Timer { kind, generation }).is_err() {
                    break;
                }
            }
        });
        self.install(kind, handle);
        generation
    }

    /// Cancel the pending timer of `kind`, if any.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.invalidate(kind);
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&mut self) {
        let kinds: Vec<TimerKind> = self.slots.keys().copied().collect();
        for kind in kinds {
            self.invalidate(kind);
        }
    }

    /// Whether a fired event belongs to the live timer of its kind.
    pub fn is_current(&self, kind: TimerKind, generation: u64) -> bool {
        self.slots
            .get(&kind)
            .map(|slot| slot.generation == generation && slot.handle.is_some())
            .unwrap_or(false)
    }

    /// Whether a timer of `kind` is pending.
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.slots
            .get(&kind)
            .map(|slot| slot.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// A one-shot timer fired and was consumed; its slot is now empty.
    pub fn consume(&mut self, kind: TimerKind) {
        if let Some(slot) = self.slots.get_mut(&kind) {
            slot.handle = None;
        }
    }

    /// Number of kinds with a live task.
    pub fn pending_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .count()
    }

    fn invalidate(&mut self, kind: TimerKind) -> u64 {
        let slot = self.slots.entry(kind).or_insert(Slot {
            generation: 0,
            handle: None,
        });
        if let Some(handle) = slot.handle.take() {
            handle.abort();
            debug!("Cancelled {:?} timer (gen {})", kind, slot.generation);
        }
        slot.generation += 1;
        slot.generation
    }

    fn install(&mut self, kind: TimerKind, handle: JoinHandle<()>) {
        if let Some(slot) = self.slots.get_mut(&kind) {
            slot.handle = Some(handle);
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        for slot in self.slots.values_mut() {
            if let Some(handle) = slot.handle.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::{channel, EventReceiver};

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    fn drain(rx: &mut EventReceiver) -> Vec<KioskEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_fires_after_delay() {
        let (tx, mut rx) = channel();
        let mut timers = Timers::new(tx);
        let generation = timers.schedule(TimerKind::LeaderboardTimeout, Duration::from_secs(20));

        tokio::time::advance(Duration::from_secs(19)).await;
        settle().await;
        assert!(drain(&mut rx).is_empty());

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        let fired = drain(&mut rx);
        assert_eq!(
            fired,
            vec![KioskEvent::Timer { kind: TimerKind::LeaderboardTimeout, generation }]
        );
        assert!(timers.is_current(TimerKind::LeaderboardTimeout, generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes() {
        let (tx, mut rx) = channel();
        let mut timers = Timers::new(tx);
        let first = timers.schedule(TimerKind::QuizQuestion, Duration::from_secs(1));
        let second = timers.schedule(TimerKind::QuizQuestion, Duration::from_secs(2));
        assert_ne!(first, second);
        assert!(!timers.is_current(TimerKind::QuizQuestion, first));

        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;
        let fired = drain(&mut rx);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0], KioskEvent::Timer { kind: TimerKind::QuizQuestion, generation: second });
    }

    #[tokio::test(start_paused = true)]
    async fn test_kinds_are_independent() {
        let (tx, mut rx) = channel();
        let mut timers = Timers::new(tx);
        timers.schedule(TimerKind::QuizQuestion, Duration::from_secs(1));
        let inactivity = timers.schedule(TimerKind::QuizInactivity, Duration::from_secs(1));

        timers.cancel(TimerKind::QuizQuestion);
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;

        let fired = drain(&mut rx);
        assert_eq!(
            fired,
            vec![KioskEvent::Timer { kind: TimerKind::QuizInactivity, generation: inactivity }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_event_already_queued_is_stale() {
        let (tx, mut rx) = channel();
        let mut timers = Timers::new(tx);
        let generation = timers.schedule(TimerKind::WelcomeIdle, Duration::from_millis(10));

        tokio::time::advance(Duration::from_millis(10)).await;
        settle().await;
        timers.cancel(TimerKind::WelcomeIdle);

        let fired = drain(&mut rx);
        assert_eq!(fired.len(), 1);
        assert!(!timers.is_current(TimerKind::WelcomeIdle, generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeating_until_cancel_all() {
        let (tx, mut rx) = channel();
        let mut timers = Timers::new(tx);
        timers.schedule_repeating(TimerKind::IdleStep, Duration::from_millis(250));

        for _ in 0..3 {
            tokio::time::advance(Duration::from_millis(250)).await;
            settle().await;
        }
        assert_eq!(drain(&mut rx).len(), 3);

        timers.cancel_all();
        settle().await;
        assert_eq!(timers.pending_count(), 0);
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert!(drain(&mut rx).is_empty());
    }
}
