//! Restartable one-shot inactivity timer.
//!
//! Provides:
//! - `reset`: cancel any pending timer and arm a new one
//! - `cancel`: disarm, idempotent
//! - a generation counter so a timer that was replaced can never fire late

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;

/// Callback invoked when the timer fires.
pub type FireCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// State shared between the scheduler handle and its timer task.
#[derive(Default)]
struct TimerSlot {
    /// Bumped on every reset/cancel. A sleeping task only fires if its
    /// generation is still current when it wakes.
    generation: u64,
    /// The armed timer, if any.
    pending: Option<JoinHandle<()>>,
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

/// A one-shot timer that is re-armed on every user turn.
///
/// Armed (a timer is pending) or idle. Firing runs on its own tokio task, so
/// the caller never blocks while the timer is pending. Once `reset` or
/// `cancel` returns, the replaced timer's callback will not start.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct InactivityScheduler {
    slot: Arc<Mutex<TimerSlot>>,
}

impl InactivityScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending timer and arm a new one that runs `on_fire` once
    /// after `after` has elapsed.
    pub fn reset(&self, after: Duration, on_fire: FireCallback) {
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;
        if let Some(previous) = slot.pending.take() {
            previous.abort();
        }

        let weak = Arc::downgrade(&self.slot);
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if claim(&weak, generation) {
                on_fire().await;
            }
        }));
    }

    /// Disarm the pending timer, if any. Calling this while idle is a no-op.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(pending) = slot.pending.take() {
            pending.abort();
            tracing::debug!("inactivity timer cancelled");
        }
    }

    /// Whether a timer is pending.
    pub fn is_armed(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }
}

/// Mark the timer of `generation` as fired. Returns false when it was
/// replaced or cancelled while sleeping, or the scheduler is gone.
fn claim(slot: &Weak<Mutex<TimerSlot>>, generation: u64) -> bool {
    let Some(slot) = slot.upgrade() else {
        return false;
    };
    let mut slot = lock(&slot);
    if slot.generation != generation {
        return false;
    }
    // Detach rather than abort: this task is the one running.
    slot.pending = None;
    true
}

fn lock(slot: &Mutex<TimerSlot>) -> MutexGuard<'_, TimerSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
