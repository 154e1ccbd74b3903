use super::{AutosaveSettings, Model};
use crate::error::AutosaveError;
use crate::filter::PropertyFilter;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Save function invoked with the proxy's target as receiver
pub type SaveFn<M> = Arc<dyn Fn(&M) -> anyhow::Result<()> + Send + Sync>;

/// Built-in quiet period before an automatic save
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// One layer of autosave configuration.
///
/// Three layers are merged when a proxy is constructed, in increasing
/// precedence: built-in defaults, the process-wide layer set through
/// [`crate::global::configure`], and the options passed to the constructor.
///
/// # Example
/// ```ignore
/// let options = AutosaveOptions::<Record<String>>::new()
///     .save_delay(Duration::from_millis(250))
///     .only(["title", "body"])
///     .save(|record| store.put(record));
/// ```
pub struct AutosaveOptions<M: Model> {
    pub settings: AutosaveSettings,
    save: Option<SaveFn<M>>,
}

impl<M: Model> AutosaveOptions<M> {
    /// Create an empty layer that overrides nothing
    pub fn new() -> Self {
        Self {
            settings: AutosaveSettings::default(),
            save: None,
        }
    }

    /// Set the save function
    pub fn save<F>(mut self, save: F) -> Self
    where
        F: Fn(&M) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.save = Some(Arc::new(save));
        self
    }

    /// Set the quiet period before an automatic save
    pub fn save_delay(mut self, delay: Duration) -> Self {
        self.settings.save_delay_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Track only the given properties
    pub fn only<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.only = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Track every property except the given ones
    pub fn except<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.except = Some(properties.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the serializable settings, keeping the save function
    pub fn with_settings(mut self, settings: AutosaveSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The save function configured on this layer, if any
    pub fn save_fn(&self) -> Option<&SaveFn<M>> {
        self.save.as_ref()
    }

    /// Field-wise merge where `over` wins wherever it sets a field
    pub fn merge(&self, over: &AutosaveOptions<M>) -> AutosaveOptions<M> {
        AutosaveOptions {
            settings: self.settings.merge(&over.settings),
            save: over.save.clone().or_else(|| self.save.clone()),
        }
    }
}

impl<M: Model> Default for AutosaveOptions<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Clone for AutosaveOptions<M> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings.clone(),
            save: self.save.clone(),
        }
    }
}

impl<M: Model> fmt::Debug for AutosaveOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutosaveOptions")
            .field("settings", &self.settings)
            .field("save", &self.save.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Fully resolved, immutable options of one proxy instance
pub struct ResolvedOptions<M: Model> {
    save: SaveFn<M>,
    save_delay: Duration,
    filter: PropertyFilter,
}

impl<M: Model> ResolvedOptions<M> {
    /// Merge built-in defaults, `global` and `instance` (in that order of precedence).
    ///
    /// # Errors
    /// [`AutosaveError::ConflictingFilters`] if the merged layers configure
    /// both `only` and `except`, even when they come from different layers.
    pub fn resolve(
        global: &AutosaveOptions<M>,
        instance: &AutosaveOptions<M>,
    ) -> Result<Self, AutosaveError> {
        let merged = global.merge(instance);
        let filter = PropertyFilter::from_lists(
            merged.settings.only.as_deref(),
            merged.settings.except.as_deref(),
        )?;

        let save: SaveFn<M> = match merged.save {
            Some(save) => save,
            None => Arc::new(|model: &M| model.save()),
        };

        Ok(Self {
            save,
            save_delay: merged.settings.save_delay().unwrap_or(DEFAULT_SAVE_DELAY),
            filter,
        })
    }

    pub fn save_fn(&self) -> &SaveFn<M> {
        &self.save
    }

    pub fn save_delay(&self) -> Duration {
        self.save_delay
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }
}

impl<M: Model> Clone for ResolvedOptions<M> {
    fn clone(&self) -> Self {
        Self {
            save: Arc::clone(&self.save),
            save_delay: self.save_delay,
            filter: self.filter.clone(),
        }
    }
}

impl<M: Model> fmt::Debug for ResolvedOptions<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("save_delay", &self.save_delay)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
