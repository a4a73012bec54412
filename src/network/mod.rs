//! Network Layer
//!
//! WebSocket bridge to the touchscreen front end.
//! This layer holds no session state - all game logic runs through `session/`.

pub mod protocol;
pub mod server;

pub use protocol::{ClientMessage, ServerMessage};
pub use server::{UiServer, UiServerError};
