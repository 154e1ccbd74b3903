//! Process-wide autosave options.
//!
//! One options layer per model type, sitting between the built-in defaults
//! and the options passed to each proxy. A proxy reads this layer once, when
//! it is constructed; configuring later does not affect existing proxies.

use crate::error::AutosaveError;
use crate::filter::PropertyFilter;
use crate::models::{AutosaveOptions, AutosaveSettings, Model};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

type Registry = RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Set the global options for proxies over `M`, replacing any earlier call.
///
/// # Errors
/// [`AutosaveError::ConflictingFilters`] if `options` configures both
/// `only` and `except`
pub fn configure<M: Model>(options: AutosaveOptions<M>) -> Result<(), AutosaveError> {
    PropertyFilter::from_lists(
        options.settings.only.as_deref(),
        options.settings.except.as_deref(),
    )?;

    tracing::info!(
        "Global autosave options set for {}: {:?}",
        std::any::type_name::<M>(),
        options.settings
    );
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(TypeId::of::<M>(), Box::new(options));
    Ok(())
}

/// Replace only the serializable settings of the global layer for `M`,
/// keeping any configured save function
///
/// # Errors
/// Same as [`configure`]
pub fn configure_settings<M: Model>(settings: AutosaveSettings) -> Result<(), AutosaveError> {
    configure(options::<M>().with_settings(settings))
}

/// Current global options for `M` (empty if never configured)
pub fn options<M: Model>() -> AutosaveOptions<M> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<M>())
        .and_then(|options| options.downcast_ref::<AutosaveOptions<M>>())
        .cloned()
        .unwrap_or_default()
}

/// Remove the global options for `M`
pub fn reset<M: Model>() {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&TypeId::of::<M>());
}
