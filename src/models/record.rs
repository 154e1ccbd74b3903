use super::Model;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// In-memory property bag implementing [`Model`].
///
/// Holds the live properties and a copy of them as of the last
/// [`save()`](Model::save), so callers can tell what has been persisted.
#[derive(Debug)]
pub struct Record<V> {
    properties: RwLock<IndexMap<String, V>>,
    persisted: RwLock<IndexMap<String, V>>,
    save_count: AtomicUsize,
}

impl<V: Clone> Record<V> {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            properties: RwLock::new(IndexMap::new()),
            persisted: RwLock::new(IndexMap::new()),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Create a record whose initial properties count as already persisted
    pub fn from_properties<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let properties: IndexMap<String, V> = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        Self {
            persisted: RwLock::new(properties.clone()),
            properties: RwLock::new(properties),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Clone of the current properties
    pub fn snapshot(&self) -> IndexMap<String, V> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clone of the properties as of the last save
    pub fn persisted(&self) -> IndexMap<String, V> {
        self.persisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Persisted value of a single property
    pub fn persisted_value(&self, key: &str) -> Option<V> {
        self.persisted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of times the record has been saved
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

impl<V: Clone + PartialEq> Record<V> {
    /// Check if the live properties differ from the persisted ones
    pub fn is_dirty(&self) -> bool {
        self.snapshot() != self.persisted()
    }
}

impl<V: Clone> Default for Record<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync + 'static> Model for Record<V> {
    type Value = V;

    fn get(&self, key: &str) -> Option<V> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: V) {
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn save(&self) -> anyhow::Result<()> {
        let snapshot = self.snapshot();
        let count = snapshot.len();
        *self.persisted.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.save_count.fetch_add(1, Ordering::SeqCst);

        tracing::debug!("Record saved ({} properties)", count);
        Ok(())
    }
}
