use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a save function.
///
/// Wraps the save function's `anyhow::Error` in an `Arc` so the same failure
/// can be returned to a flushing caller and broadcast to event subscribers.
#[derive(Error, Debug, Clone)]
#[error("{0:#}")]
pub struct SaveError(Arc<anyhow::Error>);

impl SaveError {
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }

    /// The underlying error returned by the save function
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl From<anyhow::Error> for SaveError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

/// Errors that can occur while configuring or driving an autosave proxy
#[derive(Error, Debug)]
pub enum AutosaveError {
    #[error("You can configure the `only` option or the `except` option, but not both")]
    ConflictingFilters,

    #[error("`{0}` is the proxy's content slot; use set_content to replace the target")]
    ReservedProperty(String),

    #[error("Cannot set `{0}`: the proxy has no target")]
    NoTarget(String),

    #[error("No tokio runtime available to schedule saves: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),
}
