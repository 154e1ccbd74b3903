//! Data models for the autosave proxy.
//!
//! This module contains the types a proxy is built from:
//! - [`Model`]: The host object capability (observable get/set plus a default save)
//! - [`Record`]: An in-memory property bag implementing [`Model`]
//! - [`AutosaveSettings`]: The serializable part of the options (`save_delay_ms`, `only`, `except`)
//! - [`AutosaveOptions`]: One configuration layer, settings plus an optional save function
//! - [`ResolvedOptions`]: The immutable result of merging defaults, global and instance layers
//!
//! # Architecture Note
//!
//! Options are resolved exactly once, when a proxy is constructed. Later
//! changes to the global layer only affect proxies created afterwards.

pub mod config;
pub mod model;
pub mod options;
pub mod record;

pub use config::AutosaveSettings;
pub use model::Model;
pub use options::{AutosaveOptions, DEFAULT_SAVE_DELAY, ResolvedOptions, SaveFn};
pub use record::Record;
