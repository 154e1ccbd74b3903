/// An object whose properties an autosave proxy can forward to.
///
/// Implementors provide observable get/set by name and a default
/// persistence action. Writes go through `&self`; a model that is shared
/// between a proxy and its owner handles its own interior mutability.
///
/// # Related Types
///
/// - [`crate::proxy::AutosaveProxy`]: Forwards reads/writes to a `Model`
/// - [`crate::models::Record`]: Ready-made in-memory implementation
pub trait Model: Send + Sync + 'static {
    /// Type of the values stored under property names
    type Value: Clone + Send + Sync + 'static;

    /// Read the current value of `key`, or `None` if the model has no such property
    fn get(&self, key: &str) -> Option<Self::Value>;

    /// Write `value` under `key`
    fn set(&self, key: &str, value: Self::Value);

    /// Persist the model.
    ///
    /// Used as the save function when no layer of the options provides one.
    fn save(&self) -> anyhow::Result<()>;
}
