//! Protocol Messages
//!
//! JSON wire format between the kiosk and its touchscreen front end.
//! The front end sends intents; the kiosk pushes render commands.

use serde::{Deserialize, Serialize};

use crate::game::name::{KeySource, NameKey};
use crate::session::events::KioskEvent;
use crate::session::render::RenderCommand;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start / proceed button.
    Proceed,

    /// Quiz option tapped.
    Answer { option: usize },

    /// Keyboard key on the score screen.
    NameKey {
        key: NameKey,
        #[serde(default)]
        source: KeySource,
    },

    /// Back to the welcome screen.
    ReturnToWelcome,

    /// Operator skips the agility run.
    SkipAgility,

    /// Liveness check.
    Ping { timestamp: u64 },
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Orchestrator event for this message. `None` for messages the server
    /// answers itself.
    pub fn into_event(self) -> Option<KioskEvent> {
        match self {
            ClientMessage::Proceed => Some(KioskEvent::Proceed),
            ClientMessage::Answer { option } => Some(KioskEvent::Answer { option }),
            ClientMessage::NameKey { key, source } => Some(KioskEvent::key(key, source)),
            ClientMessage::ReturnToWelcome => Some(KioskEvent::ReturnToWelcome),
            ClientMessage::SkipAgility => Some(KioskEvent::SkipAgility),
            ClientMessage::Ping { .. } => None,
        }
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages pushed to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Render command from the orchestrator.
    Render { command: RenderCommand },

    /// Reply to `Ping`.
    Pong { timestamp: u64, server_time: u64 },

    /// Message could not be understood.
    Error { message: String },

    /// Kiosk is stopping.
    Shutdown { reason: String },
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<RenderCommand> for ServerMessage {
    fn from(command: RenderCommand) -> Self {
        ServerMessage::Render { command }
    }
}
