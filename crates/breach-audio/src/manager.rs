//! Callback Manager
//!
//! Registry of pending event callbacks. Handles:
//! - Game object registration lifecycle
//! - Callback package creation and removal
//! - Cancellation by cookie or delegate identity
//! - Routing sound engine callbacks to the right package
//!
//! ## Thread Safety Design
//!
//! Gameplay threads create, cancel and register; the sound engine calls
//! `dispatch` from its own thread. One mutex guards both indices and is only
//! held for map operations:
//! - delegates delivered on the game thread stay registered until the queued
//!   delivery runs, so unregister and cancel still reach them
//! - user handlers never run under it
//! - cancelled packages are marked inert while detached, so a terminal
//!   dispatch racing a cancel sees exactly one of them win
//! - cancel hooks run after the lock is released, so a handler may call back
//!   into the manager

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use breach_core::GameObjectId;

use crate::callback::{CallbackFlags, CallbackInfo, CallbackType};
use crate::config::{CallbackManagerConfig, DelegateDelivery};
use crate::dispatch::GameThreadQueue;
use crate::package::{CallbackPackage, CallbackTarget, LookupKey, PackageId, PackageKind};

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Both indices, only touched under the manager lock.
///
/// A package is in `by_key` iff it is in exactly one set of `objects`.
/// Objects without pending packages have no entry in `objects`.
#[derive(Default)]
struct RegistryState {
    /// Objects registered by the host
    registered: HashSet<GameObjectId>,
    /// Pending packages per game object
    objects: HashMap<GameObjectId, HashMap<PackageId, Arc<CallbackPackage>>>,
    /// Lookup key → packages, for cancel by handle
    by_key: HashMap<LookupKey, Vec<Arc<CallbackPackage>>>,
}

impl RegistryState {
    fn insert(&mut self, package: &Arc<CallbackPackage>) {
        self.objects
            .entry(package.game_object())
            .or_default()
            .insert(package.id(), Arc::clone(package));
        self.by_key
            .entry(package.lookup_key())
            .or_default()
            .push(Arc::clone(package));
    }

    /// Remove from both indices, `None` if not pending on `game_object`
    fn detach(
        &mut self,
        package: &CallbackPackage,
        game_object: GameObjectId,
    ) -> Option<Arc<CallbackPackage>> {
        let removed = self.detach_from_object(package.id(), game_object)?;
        self.detach_from_key(&removed);
        Some(removed)
    }

    fn detach_from_object(
        &mut self,
        id: PackageId,
        game_object: GameObjectId,
    ) -> Option<Arc<CallbackPackage>> {
        let set = self.objects.get_mut(&game_object)?;
        let removed = set.remove(&id);
        if set.is_empty() {
            self.objects.remove(&game_object);
        }
        removed
    }

    fn detach_from_key(&mut self, package: &CallbackPackage) {
        let key = package.lookup_key();
        if let Some(list) = self.by_key.get_mut(&key) {
            list.retain(|p| p.id() != package.id());
            if list.is_empty() {
                self.by_key.remove(&key);
            }
        }
    }

    fn drain_all(&mut self) -> Vec<Arc<CallbackPackage>> {
        self.by_key.clear();
        self.objects
            .drain()
            .flat_map(|(_, set)| set.into_values())
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK MANAGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Event callback registry
///
/// Owned by the host's audio subsystem and shared as `Arc<CallbackManager>`
/// with every call site.
pub struct CallbackManager {
    config: CallbackManagerConfig,
    /// Shared with deliveries queued for the game thread
    state: Arc<Mutex<RegistryState>>,
    game_thread: GameThreadQueue,
}

impl CallbackManager {
    pub fn new(config: CallbackManagerConfig) -> Self {
        let game_thread = GameThreadQueue::new(config.game_thread_queue_capacity);
        Self {
            config,
            state: Arc::new(Mutex::new(RegistryState::default())),
            game_thread,
        }
    }

    pub fn config(&self) -> &CallbackManagerConfig {
        &self.config
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GAME OBJECTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn register_game_object(&self, game_object: GameObjectId) {
        self.state.lock().registered.insert(game_object);
    }

    /// Forget a game object, cancelling everything still pending on it.
    ///
    /// Returns the number of packages cancelled.
    pub fn unregister_game_object(&self, game_object: GameObjectId) -> usize {
        let pending: Vec<Arc<CallbackPackage>> = {
            let mut state = self.state.lock();
            state.registered.remove(&game_object);
            let Some(set) = state.objects.remove(&game_object) else {
                return 0;
            };
            for package in set.values() {
                package.mark_cancelled();
                state.detach_from_key(package);
            }
            set.into_values().collect()
        };

        for package in &pending {
            package.cancel_callback();
        }

        log::debug!(
            "Unregistered game object {} with {} pending callback(s)",
            game_object,
            pending.len()
        );
        pending.len()
    }

    pub fn is_registered(&self, game_object: GameObjectId) -> bool {
        self.state.lock().registered.contains(&game_object)
    }

    /// Whether callbacks are still pending on the object. The host waits for
    /// this to turn false before destroying the object.
    pub fn has_active_events(&self, game_object: GameObjectId) -> bool {
        self.state
            .lock()
            .objects
            .get(&game_object)
            .is_some_and(|set| !set.is_empty())
    }

    pub fn active_package_count(&self, game_object: GameObjectId) -> usize {
        self.state
            .lock()
            .objects
            .get(&game_object)
            .map_or(0, |set| set.len())
    }

    pub fn total_package_count(&self) -> usize {
        self.state.lock().objects.values().map(|set| set.len()).sum()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PACKAGES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Create a package and index it under `game_object` and its lookup key.
    ///
    /// The returned package is the context handed to the sound engine.
    pub fn create_callback_package(
        &self,
        target: CallbackTarget,
        flags: CallbackFlags,
        game_object: GameObjectId,
        has_external_sources: bool,
    ) -> Arc<CallbackPackage> {
        let package = Arc::new(CallbackPackage::new(
            target,
            flags,
            game_object,
            has_external_sources,
        ));

        {
            let mut state = self.state.lock();
            if self.config.warn_on_unregistered_object && !state.registered.contains(&game_object)
            {
                log::warn!(
                    "Creating callback package for unregistered game object {}",
                    game_object
                );
            }
            state.insert(&package);
        }

        log::debug!(
            "Created {:?} callback package {} on game object {} (flags {:?})",
            package.kind(),
            package.id(),
            game_object,
            package.user_flags()
        );
        package
    }

    /// Drop the registry's references to a package.
    ///
    /// Returns false, and changes nothing, if the package is not pending on
    /// `game_object`.
    pub fn remove_callback_package(
        &self,
        package: &CallbackPackage,
        game_object: GameObjectId,
    ) -> bool {
        let removed = self.state.lock().detach(package, game_object).is_some();
        if !removed {
            log::debug!(
                "Callback package {} is not pending on game object {}",
                package.id(),
                game_object
            );
        }
        removed
    }

    /// Cancel every package registered with the given cookie or delegate.
    ///
    /// A callback already running finishes; one that has not started yet
    /// will not reach the user target. Returns the number cancelled.
    pub fn cancel_event_callback(&self, handle: impl Into<LookupKey>) -> usize {
        let key = handle.into();
        let cancelled = {
            let mut state = self.state.lock();
            let Some(packages) = state.by_key.remove(&key) else {
                return 0;
            };
            for package in &packages {
                package.mark_cancelled();
                state.detach_from_object(package.id(), package.game_object());
            }
            packages
        };

        for package in &cancelled {
            package.cancel_callback();
        }

        log::debug!("Cancelled {} callback package(s) for {:?}", cancelled.len(), key);
        cancelled.len()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DISPATCH
    // ═══════════════════════════════════════════════════════════════════════════

    /// Sound engine callback entry point.
    ///
    /// A terminal callback also removes the package from the registry. For
    /// delegates delivered on the game thread, the whole delivery, removal
    /// included, happens when the queue is pumped.
    pub fn dispatch(
        &self,
        package: &Arc<CallbackPackage>,
        callback_type: CallbackType,
        info: &CallbackInfo,
    ) {
        if !package.should_execute() {
            return;
        }

        if !self.delivers_on_game_thread(package) {
            deliver(&self.state, package, callback_type, info);
            return;
        }

        let state = Arc::clone(&self.state);
        let queued = Arc::clone(package);
        let queued_info = info.clone();
        let posted = self.game_thread.post(Box::new(move || {
            deliver(&state, &queued, callback_type, &queued_info);
        }));

        // A dropped end of event must still release the package
        if !posted && callback_type.is_terminal() {
            self.state.lock().detach(package, package.game_object());
        }
    }

    fn delivers_on_game_thread(&self, package: &CallbackPackage) -> bool {
        package.kind() == PackageKind::Delegate
            && self.config.delegate_delivery == DelegateDelivery::GameThread
    }

    /// Run delegate callbacks queued for the game thread
    pub fn pump_game_thread(&self) -> usize {
        self.game_thread.pump()
    }

    pub fn queued_game_thread_callbacks(&self) -> usize {
        self.game_thread.len()
    }
}

/// Run one callback against a package on the current thread
fn deliver(
    state: &Mutex<RegistryState>,
    package: &Arc<CallbackPackage>,
    callback_type: CallbackType,
    info: &CallbackInfo,
) {
    if !package.should_execute() {
        return;
    }

    let finished = callback_type.is_terminal()
        && state.lock().detach(package, package.game_object()).is_some();

    if package.user_flags().wants(callback_type) {
        package.handle_action(callback_type, info);
    }

    if finished {
        log::debug!(
            "Callback package {} finished (playing id {})",
            package.id(),
            info.playing_id
        );
        if package.has_external_sources() {
            log::debug!(
                "Playing id {} ended with external sources attached",
                info.playing_id
            );
        }
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new(CallbackManagerConfig::default())
    }
}

impl Drop for CallbackManager {
    fn drop(&mut self) {
        // The engine may still hold contexts; make them inert
        let pending = self.state.lock().drain_all();
        for package in &pending {
            package.cancel_callback();
        }
        if !pending.is_empty() {
            log::debug!(
                "Callback manager dropped with {} pending package(s)",
                pending.len()
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
