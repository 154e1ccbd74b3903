// autosave - Debounced autosave proxy for observable model objects
//
// Property writes through a proxy are mirrored onto the wrapped model and,
// for tracked properties, persisted once the writes go quiet.

pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod filter;
pub mod global;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod property;
pub mod proxy;

// Re-export commonly used types for convenience
pub use crate::config::ConfigManager;
pub use error::{AutosaveError, SaveError};
pub use events::{SaveEvent, SaveTrigger};
pub use filter::PropertyFilter;
pub use models::{AutosaveOptions, AutosaveSettings, Model, Record, ResolvedOptions};
pub use property::AutosaveProperty;
pub use proxy::{AutosaveProxy, CONTENT_KEY, Tracking};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
