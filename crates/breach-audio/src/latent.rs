//! Latent "wait for end of event" actions
//!
//! A `WaitEndOfEventAction` is owned by gameplay code that polls it until the
//! posted event finishes. The callback package only holds a `ValidityToken`
//! to the shared state; once the action is dropped the token goes invalid and
//! a late end-of-event callback does nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct LatentState {
    id: u64,
    valid: AtomicBool,
    finished: AtomicBool,
}

/// Shared handle checked before a latent callback touches its action
#[derive(Debug, Clone)]
pub struct ValidityToken {
    state: Arc<LatentState>,
}

impl ValidityToken {
    /// Identity of the action this token belongs to
    #[inline]
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// False once the owning action has been dropped
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state.valid.load(Ordering::Acquire)
    }

    /// Flag the action as finished. Returns false if the action is gone.
    pub fn mark_finished(&self) -> bool {
        if !self.is_valid() {
            return false;
        }
        self.state.finished.store(true, Ordering::Release);
        true
    }
}

/// Pending "wait until the event ends" operation
#[derive(Debug)]
pub struct WaitEndOfEventAction {
    state: Arc<LatentState>,
}

impl WaitEndOfEventAction {
    pub fn new() -> Self {
        Self {
            state: Arc::new(LatentState {
                id: NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed),
                valid: AtomicBool::new(true),
                finished: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Poll from the owning thread
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    pub fn validity_token(&self) -> ValidityToken {
        ValidityToken {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for WaitEndOfEventAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WaitEndOfEventAction {
    fn drop(&mut self) {
        self.state.valid.store(false, Ordering::Release);
    }
}
