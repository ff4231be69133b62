//! Configuration for the callback manager

use std::path::Path;

use serde::{Deserialize, Serialize};

use breach_core::{BreachError, BreachResult};

/// Where delegate callbacks run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegateDelivery {
    /// Directly on the sound engine's callback thread
    Immediate,
    /// Queued and run by `CallbackManager::pump_game_thread`
    #[default]
    GameThread,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackManagerConfig {
    pub delegate_delivery: DelegateDelivery,
    /// `None` for an unbounded game thread queue
    pub game_thread_queue_capacity: Option<usize>,
    /// Warn when a package is created for an object that was never registered
    pub warn_on_unregistered_object: bool,
}

impl Default for CallbackManagerConfig {
    fn default() -> Self {
        Self {
            delegate_delivery: DelegateDelivery::GameThread,
            game_thread_queue_capacity: None,
            warn_on_unregistered_object: true,
        }
    }
}

impl CallbackManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delegate_delivery(mut self, delivery: DelegateDelivery) -> Self {
        self.delegate_delivery = delivery;
        self
    }

    pub fn game_thread_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.game_thread_queue_capacity = capacity;
        self
    }

    pub fn warn_on_unregistered_object(mut self, warn: bool) -> Self {
        self.warn_on_unregistered_object = warn;
        self
    }

    pub fn validate(&self) -> BreachResult<()> {
        if self.game_thread_queue_capacity == Some(0) {
            return Err(BreachError::Config(
                "game_thread_queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> BreachResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> BreachResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }
}
