// Property filter
//
// Decides, per property name, whether a write should schedule a save.

use crate::error::AutosaveError;
use indexmap::IndexSet;

/// Which property writes are tracked by an autosave proxy
///
/// Built from the `only` and `except` option lists. The two lists are
/// mutually exclusive; when neither is configured every write is tracked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PropertyFilter {
    /// Every property is tracked
    #[default]
    All,

    /// Only the listed properties are tracked
    Only(IndexSet<String>),

    /// Every property except the listed ones is tracked
    Except(IndexSet<String>),
}

impl PropertyFilter {
    /// Build a filter from the optional `only` and `except` lists.
    ///
    /// A list that is present counts as configured even when empty, so
    /// `only = []` tracks nothing and `only = [], except = []` is rejected.
    ///
    /// # Errors
    /// [`AutosaveError::ConflictingFilters`] if both lists are present
    pub fn from_lists(
        only: Option<&[String]>,
        except: Option<&[String]>,
    ) -> Result<Self, AutosaveError> {
        match (only, except) {
            (Some(_), Some(_)) => Err(AutosaveError::ConflictingFilters),
            (Some(only), None) => Ok(Self::Only(only.iter().cloned().collect())),
            (None, Some(except)) => Ok(Self::Except(except.iter().cloned().collect())),
            (None, None) => Ok(Self::All),
        }
    }

    /// Check whether a write to `property` should schedule a save
    pub fn is_tracked(&self, property: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(names) => names.contains(property),
            Self::Except(names) => !names.contains(property),
        }
    }
}
