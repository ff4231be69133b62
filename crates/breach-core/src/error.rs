//! Error types for Breach

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{EventId, GameObjectId};

/// Result code returned by the external sound engine.
///
/// Carried through as-is; only success is interpreted on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineStatus(pub u32);

impl EngineStatus {
    pub const SUCCESS: Self = Self(1);
    pub const FAIL: Self = Self(2);
    pub const INVALID_PARAMETER: Self = Self(31);

    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Convert into a `BreachResult`, wrapping any non-success code
    #[inline]
    pub fn ok(self) -> BreachResult<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(BreachError::Engine(self))
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine result {}", self.0)
    }
}

/// Core error type
#[derive(Error, Debug)]
pub enum BreachError {
    #[error("Invalid game object: {0}")]
    InvalidGameObject(GameObjectId),

    #[error("Sound engine error: {0}")]
    Engine(EngineStatus),

    #[error("Failed to post event {event_id} on game object {game_object}")]
    PostEventFailed {
        event_id: EventId,
        game_object: GameObjectId,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown item type: {0}")]
    UnknownItemType(String),
}

impl From<serde_json::Error> for BreachError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias
pub type BreachResult<T> = Result<T, BreachError>;
