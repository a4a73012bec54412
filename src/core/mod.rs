//! Core primitives shared by the game logic and the orchestrator.

pub mod clock;
pub mod debounce;
pub mod rng;

// Re-export core types
pub use clock::{FixedClock, SystemClock, WallClock};
pub use debounce::Debouncer;
pub use rng::DeterministicRng;
