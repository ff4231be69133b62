//! Game thread marshalling
//!
//! Delegate callbacks must not run on the sound engine's thread. They are
//! queued here and executed when the host pumps the queue from its game loop.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

/// Deferred work executed on the game thread
pub type GameThreadTask = Box<dyn FnOnce() + Send + 'static>;

/// Producer side, for threads that only enqueue
#[derive(Clone)]
pub struct GameThreadSender {
    tx: Sender<GameThreadTask>,
}

impl GameThreadSender {
    /// Queue a task. Returns false if the queue is full or gone.
    pub fn post(&self, task: GameThreadTask) -> bool {
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("Game thread queue full, dropping callback");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Game thread queue disconnected, dropping callback");
                false
            }
        }
    }
}

/// Task queue drained by the host's game thread
pub struct GameThreadQueue {
    sender: GameThreadSender,
    rx: Receiver<GameThreadTask>,
}

impl GameThreadQueue {
    /// `None` capacity means unbounded
    pub fn new(capacity: Option<usize>) -> Self {
        let (tx, rx) = match capacity {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };
        Self {
            sender: GameThreadSender { tx },
            rx,
        }
    }

    pub fn sender(&self) -> GameThreadSender {
        self.sender.clone()
    }

    /// Queue a task, see `GameThreadSender::post`
    pub fn post(&self, task: GameThreadTask) -> bool {
        self.sender.post(task)
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Run every task queued so far, returns how many ran
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl Default for GameThreadQueue {
    fn default() -> Self {
        Self::new(None)
    }
}
