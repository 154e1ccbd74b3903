// Computed autosave property
//
// Owns a source slot and hands out an autosave proxy over whatever the slot
// currently holds. Writing the slot tears down the old proxy and builds a
// new one.

use crate::error::AutosaveError;
use crate::models::{AutosaveOptions, Model};
use crate::proxy::AutosaveProxy;
use std::sync::Arc;

/// A source slot viewed through an autosave proxy
///
/// # Example
/// ```ignore
/// let mut draft = AutosaveProperty::new(Some(record), AutosaveOptions::new().except(["cursor"]));
///
/// draft.get()?.set("title", "Hello".to_string())?;
/// draft.set(Some(other_record))?;  // flushes the pending save on `record` first
/// ```
pub struct AutosaveProperty<M: Model> {
    source: Option<Arc<M>>,
    options: AutosaveOptions<M>,
    proxy: Option<AutosaveProxy<M>>,
}

impl<M: Model> AutosaveProperty<M> {
    /// Create the property. No proxy is built until the first [`get`](Self::get).
    pub fn new(source: Option<Arc<M>>, options: AutosaveOptions<M>) -> Self {
        Self {
            source,
            options,
            proxy: None,
        }
    }

    /// Current value of the source slot
    pub fn source(&self) -> Option<&Arc<M>> {
        self.source.as_ref()
    }

    /// Proxy over the current source value, built on first access.
    ///
    /// # Errors
    /// Any construction error of [`AutosaveProxy::create`]
    pub fn get(&mut self) -> Result<&mut AutosaveProxy<M>, AutosaveError> {
        let proxy = match self.proxy.take() {
            Some(proxy) => proxy,
            None => AutosaveProxy::create(self.source.clone(), self.options.clone())?,
        };
        Ok(self.proxy.insert(proxy))
    }

    /// Write the source slot and return a fresh proxy over the new value.
    ///
    /// The previous proxy is torn down first, so a pending save on the old
    /// value runs before the slot changes.
    ///
    /// # Errors
    /// - [`AutosaveError::Save`] if the old proxy's pending save failed; the
    ///   slot keeps its old value
    /// - Any construction error of [`AutosaveProxy::create`]
    pub fn set(&mut self, source: Option<Arc<M>>) -> Result<&mut AutosaveProxy<M>, AutosaveError> {
        if let Some(previous) = self.proxy.take() {
            previous.destroy()?;
        }

        self.source = source;
        let proxy = AutosaveProxy::create(self.source.clone(), self.options.clone())?;
        Ok(self.proxy.insert(proxy))
    }

    /// Tear down the current proxy, if any, running its pending save
    ///
    /// # Errors
    /// [`AutosaveError::Save`] if the pending save failed
    pub fn destroy(mut self) -> Result<(), AutosaveError> {
        match self.proxy.take() {
            Some(proxy) => proxy.destroy(),
            None => Ok(()),
        }
    }
}
