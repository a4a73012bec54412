//! # Stand Game
//!
//! Arcade kiosk: a reaction game on lit buttons, a touchscreen quiz and a
//! daily leaderboard, run by a single-threaded session orchestrator.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        STAND GAME                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Shared primitives                       │
//! │  ├── rng.rs        - Seedable Xorshift128+ PRNG              │
//! │  ├── debounce.rs   - Input cooldown tracking                 │
//! │  └── clock.rs      - Wall clock for leaderboard dates        │
//! │                                                              │
//! │  game/             - Pure game rules                         │
//! │  ├── state.rs      - Session phase and progress              │
//! │  ├── agility.rs    - Light-then-press rounds, scoring        │
//! │  ├── quiz.rs       - Question sampling and answers           │
//! │  ├── name.rs       - Player name buffer                      │
//! │  └── leaderboard.rs- Daily top list                          │
//! │                                                              │
//! │  session/          - The orchestrator                        │
//! │  ├── events.rs     - Event queue                             │
//! │  ├── timers.rs     - Per-kind cancellable timers             │
//! │  ├── render.rs     - Render commands, surfaces               │
//! │  └── orchestrator.rs - Session state machine                 │
//! │                                                              │
//! │  hardware/         - Buttons and relay-driven LEDs           │
//! │  network/          - WebSocket bridge to the touchscreen     │
//! │  store.rs          - Question bank and leaderboard files     │
//! │  config.rs         - Kiosk configuration and presets         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Event flow
//!
//! Hardware callbacks and front-end intents never touch session state. They
//! post a [`KioskEvent`] to the orchestrator's queue, which applies events
//! one at a time and answers with render commands and LED writes.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod hardware;
pub mod network;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigError, KioskConfig, Preset};
pub use core::rng::DeterministicRng;
pub use game::state::{GameKind, Phase, SessionState};
pub use hardware::{Hardware, HardwareError, SimulatedHardware};
pub use session::{KioskEvent, Orchestrator, RenderCommand, SessionError, Surface};
pub use store::{ScoreStore, StoreError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
