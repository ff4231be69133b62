//! Callback Packages
//!
//! A package is one outstanding request to be told about an event's
//! progress. It is handed to the sound engine as the callback context and
//! owned by the `CallbackManager` until the terminal callback, a cancel, or
//! the owning game object going away.
//!
//! Three targets are supported:
//! - plain function pointer + opaque cookie
//! - delegate (closure with a stable identity)
//! - latent "wait until end of event" action

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex, const_reentrant_mutex};

use breach_core::GameObjectId;

use crate::callback::{CallbackFlags, CallbackInfo, CallbackType};
use crate::latent::{ValidityToken, WaitEndOfEventAction};

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Unique identifier for a callback package
pub type PackageId = u64;

/// Identity of an `EventDelegate`, shared by its clones
pub type DelegateId = u64;

static NEXT_PACKAGE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_DELEGATE_ID: AtomicU64 = AtomicU64::new(1);

/// Held while a function callback runs and while one is cancelled, so a
/// cancel either lands before the should-execute check or waits for the call.
/// Reentrant: a handler may cancel its own cookie.
static FUNCTION_CANCEL_LOCK: ReentrantMutex<()> = const_reentrant_mutex(());

/// Opaque user context passed back to function callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cookie(pub u64);

/// Plain function callback
pub type EventCallbackFn = fn(CallbackType, &CallbackInfo, Cookie);

type DelegateFn = dyn Fn(CallbackType, &CallbackInfo) + Send + Sync;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT DELEGATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Bound callback with an identity usable for cancellation
#[derive(Clone)]
pub struct EventDelegate {
    id: DelegateId,
    callback: Arc<DelegateFn>,
}

impl EventDelegate {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(CallbackType, &CallbackInfo) + Send + Sync + 'static,
    {
        Self {
            id: NEXT_DELEGATE_ID.fetch_add(1, Ordering::Relaxed),
            callback: Arc::new(callback),
        }
    }

    #[inline]
    pub fn id(&self) -> DelegateId {
        self.id
    }

    pub fn call(&self, callback_type: CallbackType, info: &CallbackInfo) {
        (self.callback)(callback_type, info)
    }
}

impl fmt::Debug for EventDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDelegate").field("id", &self.id).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Identity of a caller's callback target, used to cancel by handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Cookie(Cookie),
    Delegate(DelegateId),
    Latent(u64),
}

impl From<Cookie> for LookupKey {
    fn from(cookie: Cookie) -> Self {
        LookupKey::Cookie(cookie)
    }
}

impl From<&EventDelegate> for LookupKey {
    fn from(delegate: &EventDelegate) -> Self {
        LookupKey::Delegate(delegate.id())
    }
}

impl From<&WaitEndOfEventAction> for LookupKey {
    fn from(action: &WaitEndOfEventAction) -> Self {
        LookupKey::Latent(action.id())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK TARGET
// ═══════════════════════════════════════════════════════════════════════════════

/// What a new package should call
#[derive(Debug, Clone)]
pub enum CallbackTarget {
    Function { func: EventCallbackFn, cookie: Cookie },
    Delegate(EventDelegate),
    Latent(ValidityToken),
}

impl CallbackTarget {
    pub fn function(func: EventCallbackFn, cookie: Cookie) -> Self {
        CallbackTarget::Function { func, cookie }
    }

    pub fn delegate(delegate: EventDelegate) -> Self {
        CallbackTarget::Delegate(delegate)
    }

    pub fn latent(action: &WaitEndOfEventAction) -> Self {
        CallbackTarget::Latent(action.validity_token())
    }

    pub fn lookup_key(&self) -> LookupKey {
        match self {
            CallbackTarget::Function { cookie, .. } => LookupKey::Cookie(*cookie),
            CallbackTarget::Delegate(delegate) => LookupKey::Delegate(delegate.id()),
            CallbackTarget::Latent(token) => LookupKey::Latent(token.id()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK PACKAGE
// ═══════════════════════════════════════════════════════════════════════════════

/// Package variant, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Function,
    Delegate,
    Latent,
}

enum PackageHandler {
    Function {
        func: EventCallbackFn,
        cookie: Cookie,
    },
    Delegate {
        /// Cleared on cancel
        delegate: Mutex<Option<EventDelegate>>,
    },
    Latent {
        token: ValidityToken,
    },
}

/// One outstanding callback registration
pub struct CallbackPackage {
    id: PackageId,
    game_object: GameObjectId,
    /// Copy of the caller's requested flags
    user_flags: CallbackFlags,
    lookup_key: LookupKey,
    has_external_sources: bool,
    /// Cleared once by cancellation, never re-set
    should_execute: AtomicBool,
    handler: PackageHandler,
}

impl CallbackPackage {
    pub(crate) fn new(
        target: CallbackTarget,
        flags: CallbackFlags,
        game_object: GameObjectId,
        has_external_sources: bool,
    ) -> Self {
        let lookup_key = target.lookup_key();
        let (user_flags, handler) = match target {
            CallbackTarget::Function { func, cookie } => {
                (flags, PackageHandler::Function { func, cookie })
            }
            CallbackTarget::Delegate(delegate) => (
                flags,
                PackageHandler::Delegate {
                    delegate: Mutex::new(Some(delegate)),
                },
            ),
            // Latent actions only care about the end of the event
            CallbackTarget::Latent(token) => {
                (CallbackFlags::END_OF_EVENT, PackageHandler::Latent { token })
            }
        };

        Self {
            id: NEXT_PACKAGE_ID.fetch_add(1, Ordering::Relaxed),
            game_object,
            user_flags,
            lookup_key,
            has_external_sources,
            should_execute: AtomicBool::new(true),
            handler,
        }
    }

    #[inline]
    pub fn id(&self) -> PackageId {
        self.id
    }

    #[inline]
    pub fn game_object(&self) -> GameObjectId {
        self.game_object
    }

    #[inline]
    pub fn user_flags(&self) -> CallbackFlags {
        self.user_flags
    }

    #[inline]
    pub fn lookup_key(&self) -> LookupKey {
        self.lookup_key
    }

    #[inline]
    pub fn has_external_sources(&self) -> bool {
        self.has_external_sources
    }

    /// False once cancelled
    #[inline]
    pub fn should_execute(&self) -> bool {
        self.should_execute.load(Ordering::Acquire)
    }

    pub fn kind(&self) -> PackageKind {
        match self.handler {
            PackageHandler::Function { .. } => PackageKind::Function,
            PackageHandler::Delegate { .. } => PackageKind::Delegate,
            PackageHandler::Latent { .. } => PackageKind::Latent,
        }
    }

    /// Forward a callback to the target on the calling thread. No-op once
    /// cancelled.
    pub fn handle_action(&self, callback_type: CallbackType, info: &CallbackInfo) {
        match &self.handler {
            PackageHandler::Function { func, cookie } => {
                let _guard = FUNCTION_CANCEL_LOCK.lock();
                if self.should_execute() {
                    func(callback_type, info, *cookie);
                }
            }
            PackageHandler::Delegate { delegate } => {
                if !self.should_execute() {
                    return;
                }
                // Cancel does not wait for a delegate that already got past
                // this clone; only function packages have that guarantee.
                let bound = delegate.lock().clone();
                if let Some(delegate) = bound {
                    delegate.call(callback_type, info);
                }
            }
            PackageHandler::Latent { token } => {
                if callback_type != CallbackType::EndOfEvent || !self.should_execute() {
                    return;
                }
                if !token.mark_finished() {
                    log::debug!(
                        "Latent action {} gone before end of event (package {})",
                        token.id(),
                        self.id
                    );
                }
            }
        }
    }

    /// Clear the execute flag without waiting on a running handler. Safe to
    /// call under the registry lock.
    pub(crate) fn mark_cancelled(&self) {
        self.should_execute.store(false, Ordering::Release);
    }

    /// Stop any further invocation of the user target
    pub fn cancel_callback(&self) {
        match &self.handler {
            PackageHandler::Function { .. } => {
                let _guard = FUNCTION_CANCEL_LOCK.lock();
                self.should_execute.store(false, Ordering::Release);
            }
            PackageHandler::Delegate { delegate, .. } => {
                self.should_execute.store(false, Ordering::Release);
                delegate.lock().take();
            }
            PackageHandler::Latent { .. } => {
                self.should_execute.store(false, Ordering::Release);
            }
        }
    }
}

impl fmt::Debug for CallbackPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackPackage")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("game_object", &self.game_object)
            .field("user_flags", &self.user_flags)
            .field("lookup_key", &self.lookup_key)
            .field("has_external_sources", &self.has_external_sources)
            .field("should_execute", &self.should_execute())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
