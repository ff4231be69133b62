//! Symbol effects
//!
//! A symbol combination is a data asset listing the effects fired when the
//! player completes that combination. Effects themselves are implemented by
//! game code.

use std::fmt;

/// Player controller handle passed to effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlayerId(pub u32);

/// Effect triggered by a symbol combination
pub trait SymbolEffect: Send + Sync {
    /// Apply the effect for the given player
    fn launch(&self, player: PlayerId);

    /// Name shown in tooling
    fn name(&self) -> &str {
        "SymbolEffect"
    }
}

/// Ordered set of effects fired together
#[derive(Default)]
pub struct SymbolCombination {
    pub name: String,
    effects: Vec<Box<dyn SymbolEffect>>,
}

impl SymbolCombination {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            effects: Vec::new(),
        }
    }

    pub fn add_effect(&mut self, effect: impl SymbolEffect + 'static) {
        self.effects.push(Box::new(effect));
    }

    pub fn with_effect(mut self, effect: impl SymbolEffect + 'static) -> Self {
        self.add_effect(effect);
        self
    }

    pub fn effects(&self) -> &[Box<dyn SymbolEffect>] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Launch every effect in declaration order, returns how many ran
    pub fn launch(&self, player: PlayerId) -> usize {
        log::debug!(
            "Launching symbol combination '{}' ({} effects) for player {}",
            self.name,
            self.effects.len(),
            player.0
        );
        for effect in &self.effects {
            effect.launch(player);
        }
        self.effects.len()
    }
}

impl fmt::Debug for SymbolCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolCombination")
            .field("name", &self.name)
            .field(
                "effects",
                &self.effects.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
