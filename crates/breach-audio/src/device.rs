//! Audio device
//!
//! Host-side facade over the sound engine. Posting an event with a callback
//! creates a package in the `CallbackManager` and hands it to the engine as
//! the callback context; the engine later reports back through
//! `CallbackManager::dispatch`.
//!
//! ```text
//! Game Thread                         Sound Engine Thread
//! ───────────                         ───────────────────
//! AudioDevice::post_event_*()
//!     │ create_callback_package
//!     v
//! SoundEngine::post_event(.., ctx) ──> callback(ctx, type, info)
//!                                          │
//!                                          v
//!                                   CallbackManager::dispatch
//! ```

use std::sync::Arc;

use breach_core::{
    BreachError, BreachResult, EngineStatus, EventId, GameObjectId, INVALID_PLAYING_ID,
    PlayingId, is_valid_game_object,
};

use crate::callback::CallbackFlags;
use crate::config::CallbackManagerConfig;
use crate::latent::WaitEndOfEventAction;
use crate::manager::CallbackManager;
use crate::package::{
    CallbackPackage, CallbackTarget, Cookie, EventCallbackFn, EventDelegate, LookupKey,
};

/// The external sound engine, as seen by the integration
pub trait SoundEngine: Send + Sync {
    fn register_game_object(&self, game_object: GameObjectId) -> EngineStatus;

    fn unregister_game_object(&self, game_object: GameObjectId) -> EngineStatus;

    /// Post an event. `context` is passed back with every callback.
    ///
    /// Returns `INVALID_PLAYING_ID` on failure.
    fn post_event(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
        flags: CallbackFlags,
        context: Option<Arc<CallbackPackage>>,
    ) -> PlayingId;
}

/// Sound engine plus the callback registry it reports to
pub struct AudioDevice<E: SoundEngine> {
    engine: E,
    callbacks: Arc<CallbackManager>,
}

impl<E: SoundEngine> AudioDevice<E> {
    pub fn new(engine: E, config: CallbackManagerConfig) -> Self {
        Self::with_callback_manager(engine, Arc::new(CallbackManager::new(config)))
    }

    /// Share an existing registry, e.g. one the engine's callback hook
    /// already holds
    pub fn with_callback_manager(engine: E, callbacks: Arc<CallbackManager>) -> Self {
        Self { engine, callbacks }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn callbacks(&self) -> &Arc<CallbackManager> {
        &self.callbacks
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMPONENTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn register_component(&self, game_object: GameObjectId) -> BreachResult<()> {
        if !is_valid_game_object(game_object) {
            return Err(BreachError::InvalidGameObject(game_object));
        }
        self.engine.register_game_object(game_object).ok()?;
        self.callbacks.register_game_object(game_object);
        log::info!("Registered game object {}", game_object);
        Ok(())
    }

    /// Unregister from the engine and drop any callbacks still pending
    pub fn unregister_component(&self, game_object: GameObjectId) -> BreachResult<()> {
        if !is_valid_game_object(game_object) {
            return Err(BreachError::InvalidGameObject(game_object));
        }
        let cancelled = self.callbacks.unregister_game_object(game_object);
        if cancelled > 0 {
            log::info!(
                "Game object {} unregistered with {} pending callback(s)",
                game_object,
                cancelled
            );
        }
        self.engine.unregister_game_object(game_object).ok()
    }

    pub fn has_active_events(&self, game_object: GameObjectId) -> bool {
        self.callbacks.has_active_events(game_object)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // POSTING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Post without a callback
    pub fn post_event(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
    ) -> BreachResult<PlayingId> {
        if !is_valid_game_object(game_object) {
            return Err(BreachError::InvalidGameObject(game_object));
        }
        match self
            .engine
            .post_event(event_id, game_object, CallbackFlags::empty(), None)
        {
            INVALID_PLAYING_ID => Err(BreachError::PostEventFailed {
                event_id,
                game_object,
            }),
            playing_id => Ok(playing_id),
        }
    }

    pub fn post_event_with_callback(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
        func: EventCallbackFn,
        cookie: Cookie,
        flags: CallbackFlags,
        has_external_sources: bool,
    ) -> BreachResult<PlayingId> {
        self.post_with_target(
            event_id,
            game_object,
            CallbackTarget::function(func, cookie),
            flags,
            has_external_sources,
        )
    }

    pub fn post_event_with_delegate(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
        delegate: EventDelegate,
        flags: CallbackFlags,
        has_external_sources: bool,
    ) -> BreachResult<PlayingId> {
        self.post_with_target(
            event_id,
            game_object,
            CallbackTarget::delegate(delegate),
            flags,
            has_external_sources,
        )
    }

    /// Post and let `action` report when the event has ended
    pub fn post_event_and_wait(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
        action: &WaitEndOfEventAction,
    ) -> BreachResult<PlayingId> {
        self.post_with_target(
            event_id,
            game_object,
            CallbackTarget::latent(action),
            CallbackFlags::END_OF_EVENT,
            false,
        )
    }

    pub fn cancel_event_callback(&self, handle: impl Into<LookupKey>) -> usize {
        self.callbacks.cancel_event_callback(handle)
    }

    fn post_with_target(
        &self,
        event_id: EventId,
        game_object: GameObjectId,
        target: CallbackTarget,
        flags: CallbackFlags,
        has_external_sources: bool,
    ) -> BreachResult<PlayingId> {
        if !is_valid_game_object(game_object) {
            return Err(BreachError::InvalidGameObject(game_object));
        }

        let package = self.callbacks.create_callback_package(
            target,
            flags,
            game_object,
            has_external_sources,
        );

        // End of event is always requested so the package gets released
        let engine_flags = package.user_flags() | CallbackFlags::END_OF_EVENT;
        let playing_id = self.engine.post_event(
            event_id,
            game_object,
            engine_flags,
            Some(Arc::clone(&package)),
        );

        if playing_id == INVALID_PLAYING_ID {
            self.callbacks.remove_callback_package(&package, game_object);
            log::warn!(
                "Failed to post event {} on game object {}",
                event_id,
                game_object
            );
            return Err(BreachError::PostEventFailed {
                event_id,
                game_object,
            });
        }

        Ok(playing_id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
