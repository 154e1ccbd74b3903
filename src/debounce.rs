// Debounce/flush controller
//
// Owns at most one pending save. A tracked write (re)starts the timer; the
// save runs once the timer elapses without another write, or immediately on
// a forced flush.

use crate::error::SaveError;
use crate::events::{EVENT_CHANNEL_CAPACITY, SaveEvent, SaveTrigger};
use crate::metrics::AutosaveMetrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

/// Save bound to its target, ready to run
pub type SaveCallback = Box<dyn FnOnce() -> Result<(), SaveError> + Send>;

/// A scheduled-but-not-yet-run save
///
/// Owns both the bound callback and the timer's abort handle, so whoever
/// takes it out of the pending slot decides alone whether it runs.
struct PendingSave {
    generation: u64,
    callback: SaveCallback,
    timer: AbortHandle,
}

/// State shared with timer tasks
struct Shared {
    pending: Mutex<Option<PendingSave>>,
    events: broadcast::Sender<SaveEvent>,
    metrics: AutosaveMetrics,
}

impl Shared {
    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingSave>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the pending save only if it is still the one scheduled as `generation`
    fn take_generation(&self, generation: u64) -> Option<PendingSave> {
        let mut pending = self.lock_pending();
        match pending.as_ref() {
            Some(save) if save.generation == generation => pending.take(),
            _ => None,
        }
    }

    fn emit(&self, event: SaveEvent) {
        // Ignore send errors - it's OK if no one is listening
        let _ = self.events.send(event);
    }

    fn run(&self, callback: SaveCallback, trigger: SaveTrigger) -> Result<(), SaveError> {
        match trigger {
            SaveTrigger::Automatic => self.metrics.record_automatic_save(),
            _ => self.metrics.record_forced_flush(),
        }

        match callback() {
            Ok(()) => {
                tracing::debug!("Autosave ran ({:?})", trigger);
                self.emit(SaveEvent::Saved { trigger });
                Ok(())
            }
            Err(error) => {
                self.metrics.record_save_failure();
                self.emit(SaveEvent::SaveFailed {
                    trigger,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    /// Timer callback: run the save if no flush, cancel or reschedule got to it first
    fn fire(&self, generation: u64) {
        let Some(save) = self.take_generation(generation) else {
            tracing::trace!("Timer {} fired after its save was taken", generation);
            return;
        };

        if let Err(e) = self.run(save.callback, SaveTrigger::Automatic) {
            tracing::error!("Automatic save failed: {}", e);
        }
    }
}

/// Trailing-edge debouncer with forced flush
///
/// Two states: idle (no pending save) and pending. Every transition out of
/// pending takes the save from a mutex-guarded slot, so exactly one of the
/// timer, a flush, a cancel or a reschedule ever gets a given save.
pub struct Debouncer {
    shared: Arc<Shared>,
    runtime: Handle,
    next_generation: AtomicU64,
}

impl Debouncer {
    /// Create a debouncer whose timers run on `runtime`
    pub fn new(runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                pending: Mutex::new(None),
                events,
                metrics: AutosaveMetrics::new(),
            }),
            runtime,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Schedule `callback` to run after `delay`, replacing any pending save.
    ///
    /// The replaced save's timer is aborted and its callback dropped; the
    /// new timer always starts with the full delay.
    ///
    /// # Returns
    /// `true` if a pending save was superseded
    pub fn schedule(&self, property: &str, delay: Duration, callback: SaveCallback) -> bool {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        // The slot stays locked until the new save is installed, so a timer
        // that elapses immediately blocks in `fire` until it can find its
        // own generation.
        let mut pending = self.shared.lock_pending();
        let timer = self
            .runtime
            .spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(shared) = shared.upgrade() {
                    shared.fire(generation);
                }
            })
            .abort_handle();

        let previous = pending.replace(PendingSave {
            generation,
            callback,
            timer,
        });
        drop(pending);

        let superseded = match previous {
            Some(previous) => {
                previous.timer.abort();
                true
            }
            None => false,
        };

        tracing::debug!(
            "Save scheduled in {:?} after write to `{}` (superseded: {})",
            delay,
            property,
            superseded
        );
        self.shared.metrics.record_scheduled(superseded);
        self.shared.emit(SaveEvent::Scheduled {
            property: property.to_string(),
            superseded,
        });

        superseded
    }

    /// Run the pending save now, bypassing the rest of its delay.
    ///
    /// The save is taken out of the pending slot and its timer aborted
    /// before the callback runs, so it cannot also run from the timer.
    ///
    /// # Returns
    /// - `Ok(true)` if a pending save ran
    /// - `Ok(false)` if nothing was pending
    ///
    /// # Errors
    /// The save function's error. The save is not retried.
    pub fn flush(&self, trigger: SaveTrigger) -> Result<bool, SaveError> {
        let Some(save) = self.shared.lock_pending().take() else {
            return Ok(false);
        };
        save.timer.abort();

        tracing::debug!("Flushing pending save ({:?})", trigger);
        self.shared.run(save.callback, trigger)?;
        Ok(true)
    }

    /// Drop the pending save without running it
    ///
    /// # Returns
    /// `true` if a pending save was cancelled
    pub fn cancel(&self) -> bool {
        let Some(save) = self.shared.lock_pending().take() else {
            return false;
        };
        save.timer.abort();

        tracing::debug!("Pending save cancelled");
        self.shared.metrics.record_cancelled();
        self.shared.emit(SaveEvent::Cancelled);
        true
    }

    /// Check if a save is scheduled but has not run yet
    pub fn is_pending(&self) -> bool {
        self.shared.lock_pending().is_some()
    }

    /// Broadcast an event on this debouncer's channel
    pub fn emit(&self, event: SaveEvent) {
        self.shared.emit(event);
    }

    /// Subscribe to save events
    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.shared.events.subscribe()
    }

    pub fn metrics(&self) -> &AutosaveMetrics {
        &self.shared.metrics
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        // Owners flush before dropping; anything left here is abandoned
        if self.cancel() {
            tracing::warn!("Debouncer dropped with a pending save; save discarded");
        }
    }
}
