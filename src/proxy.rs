// Autosave proxy
//
// Forwards property reads/writes to a replaceable target and schedules a
// debounced save for every tracked write.

use crate::debounce::{Debouncer, SaveCallback};
use crate::error::{AutosaveError, SaveError};
use crate::events::{SaveEvent, SaveTrigger};
use crate::global;
use crate::metrics::AutosaveMetrics;
use crate::models::{AutosaveOptions, Model, ResolvedOptions};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;

/// Name of the slot holding the proxy's target.
///
/// Reads and writes of this name are not forwarded; the target is accessed
/// through [`AutosaveProxy::content`] and [`AutosaveProxy::set_content`].
pub const CONTENT_KEY: &str = "content";

/// Outcome of a forwarded property write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracking {
    /// The write passed the property filter and (re)scheduled a save
    Tracked,

    /// The write was applied to the target without scheduling a save
    Untracked,
}

/// Proxy that mirrors writes onto a target model and saves it after a quiet period
///
/// # Forwarding table
///
/// | Operation                  | Effect                                                   |
/// |----------------------------|----------------------------------------------------------|
/// | [`get(name)`](Self::get)   | Target's value, or `None` without a target               |
/// | [`set(name, v)`](Self::set)| Write to target; tracked names (re)schedule a save        |
/// | [`set_content`](Self::set_content) | Flush pending save on the old target, then swap  |
/// | [`destroy`](Self::destroy) | Flush pending save, propagating its error                |
///
/// Saves are debounced on the trailing edge: a burst of tracked writes
/// produces exactly one save, `save_delay` after the last write.
///
/// # Usage
/// ```ignore
/// let record = Arc::new(Record::from_properties([("name", "A".to_string())]));
/// let proxy = AutosaveProxy::create(
///     Some(record.clone()),
///     AutosaveOptions::new().save_delay(Duration::from_millis(1000)).only(["name"]),
/// )?;
///
/// proxy.set("name", "B".to_string())?;  // saved ~1s later
/// proxy.destroy()?;                      // or flushed now
/// ```
///
/// # Related Types
///
/// - [`crate::debounce::Debouncer`]: Owns the pending save
/// - [`crate::property::AutosaveProperty`]: Builds proxies from a source slot
/// - [`SaveEvent`]: Emitted on scheduling, saves and failures
pub struct AutosaveProxy<M: Model> {
    content: Option<Arc<M>>,
    options: ResolvedOptions<M>,
    debouncer: Debouncer,
}

impl<M: Model> AutosaveProxy<M> {
    /// Create a proxy using the global options registered for `M` and `options`.
    ///
    /// # Errors
    /// - [`AutosaveError::ConflictingFilters`] if `only` and `except` are both configured
    /// - [`AutosaveError::NoRuntime`] if called outside a tokio runtime
    pub fn create(target: Option<Arc<M>>, options: AutosaveOptions<M>) -> Result<Self, AutosaveError> {
        Self::create_layered(target, &global::options::<M>(), &options)
    }

    /// Create a proxy from an explicit global layer and instance layer.
    ///
    /// # Errors
    /// Same as [`create`](Self::create)
    pub fn create_layered(
        target: Option<Arc<M>>,
        global: &AutosaveOptions<M>,
        instance: &AutosaveOptions<M>,
    ) -> Result<Self, AutosaveError> {
        let options = ResolvedOptions::resolve(global, instance)?;
        let runtime = Handle::try_current()?;
        Ok(Self::with_runtime(runtime, target, options))
    }

    /// Create a proxy whose save timers run on `runtime`
    pub fn with_runtime(runtime: Handle, target: Option<Arc<M>>, options: ResolvedOptions<M>) -> Self {
        tracing::debug!("Autosave proxy created: {:?}", options);
        Self {
            content: target,
            options,
            debouncer: Debouncer::new(runtime),
        }
    }

    /// Read a property from the target.
    ///
    /// Returns `None` when there is no target, when the target has no such
    /// property, and for the reserved [`CONTENT_KEY`].
    pub fn get(&self, name: &str) -> Option<M::Value> {
        if name == CONTENT_KEY {
            return None;
        }
        self.content.as_ref()?.get(name)
    }

    /// Write a property onto the target, scheduling a save if it is tracked.
    ///
    /// The write is applied immediately. A tracked write supersedes any
    /// pending save: the timer restarts with the full delay.
    ///
    /// # Errors
    /// - [`AutosaveError::ReservedProperty`] for [`CONTENT_KEY`]
    /// - [`AutosaveError::NoTarget`] if the proxy has no target
    pub fn set(&self, name: &str, value: M::Value) -> Result<Tracking, AutosaveError> {
        if name == CONTENT_KEY {
            return Err(AutosaveError::ReservedProperty(name.to_string()));
        }
        let Some(target) = self.content.as_ref() else {
            return Err(AutosaveError::NoTarget(name.to_string()));
        };

        target.set(name, value);

        if !self.options.filter().is_tracked(name) {
            tracing::trace!("Write to untracked property `{}`", name);
            self.debouncer.metrics().record_untracked_write();
            return Ok(Tracking::Untracked);
        }

        self.debouncer
            .schedule(name, self.options.save_delay(), self.bind_save(Arc::clone(target)));
        Ok(Tracking::Tracked)
    }

    /// Current target
    pub fn content(&self) -> Option<&Arc<M>> {
        self.content.as_ref()
    }

    /// Replace the target.
    ///
    /// Any pending save is run first, synchronously, against the previous
    /// target. If that save fails the target is left unchanged.
    ///
    /// # Returns
    /// The new target
    ///
    /// # Errors
    /// [`AutosaveError::Save`] if flushing the pending save failed
    pub fn set_content(&mut self, target: Option<Arc<M>>) -> Result<Option<Arc<M>>, AutosaveError> {
        self.debouncer.flush(SaveTrigger::TargetReplaced)?;

        self.content = target;
        let has_target = self.content.is_some();
        tracing::debug!("Autosave target replaced (has target: {})", has_target);
        self.debouncer.emit(SaveEvent::TargetReplaced { has_target });

        Ok(self.content.clone())
    }

    /// Run the pending save now.
    ///
    /// # Returns
    /// `Ok(true)` if a save ran, `Ok(false)` if nothing was pending
    pub fn flush(&self) -> Result<bool, AutosaveError> {
        Ok(self.debouncer.flush(SaveTrigger::Flush)?)
    }

    /// Drop the pending save without running it
    pub fn cancel(&self) -> bool {
        self.debouncer.cancel()
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn options(&self) -> &ResolvedOptions<M> {
        &self.options
    }

    /// Subscribe to this proxy's save events
    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.debouncer.subscribe()
    }

    pub fn metrics(&self) -> &AutosaveMetrics {
        self.debouncer.metrics()
    }

    /// Tear down the proxy, running any pending save synchronously.
    ///
    /// # Errors
    /// [`AutosaveError::Save`] if the pending save failed
    pub fn destroy(self) -> Result<(), AutosaveError> {
        self.debouncer.flush(SaveTrigger::Teardown)?;
        Ok(())
    }

    fn bind_save(&self, target: Arc<M>) -> SaveCallback {
        let save = Arc::clone(self.options.save_fn());
        Box::new(move || save(target.as_ref()).map_err(SaveError::new))
    }
}

impl<M: Model> Drop for AutosaveProxy<M> {
    fn drop(&mut self) {
        if !self.debouncer.is_pending() {
            return;
        }

        tracing::warn!("Autosave proxy dropped with a pending save; flushing");
        if let Err(e) = self.debouncer.flush(SaveTrigger::Teardown) {
            tracing::error!("Save during teardown failed: {}", e);
        }
    }
}
