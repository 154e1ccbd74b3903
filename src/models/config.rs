use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serializable autosave settings, as stored in `autosave.yaml`
///
/// Every field is optional: an absent field leaves the value of a
/// lower-precedence layer (or the built-in default) in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveSettings {
    /// Quiet period before an automatic save, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_delay_ms: Option<u64>,

    /// If present, only these properties are tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<String>>,

    /// If present, every property except these is tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub except: Option<Vec<String>>,
}

impl AutosaveSettings {
    /// The configured save delay, if any
    pub fn save_delay(&self) -> Option<Duration> {
        self.save_delay_ms.map(Duration::from_millis)
    }

    /// Field-wise merge where `over` wins wherever it sets a field
    pub fn merge(&self, over: &AutosaveSettings) -> AutosaveSettings {
        AutosaveSettings {
            save_delay_ms: over.save_delay_ms.or(self.save_delay_ms),
            only: over.only.clone().or_else(|| self.only.clone()),
            except: over.except.clone().or_else(|| self.except.clone()),
        }
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.save_delay_ms.is_none() && self.only.is_none() && self.except.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_is_empty() {
        let settings = AutosaveSettings::default();
        assert!(settings.is_empty());
        assert_eq!(settings.save_delay(), None);
    }

    #[test]
    fn test_merge_prefers_overriding_layer() {
        let base = AutosaveSettings {
            save_delay_ms: Some(500),
            only: Some(vec!["title".to_string()]),
            except: None,
        };
        let over = AutosaveSettings {
            save_delay_ms: Some(50),
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.save_delay_ms, Some(50));
        assert_eq!(merged.only, Some(vec!["title".to_string()]));
        assert_eq!(merged.except, None);
    }

    #[test]
    fn test_merge_keeps_both_filters() {
        // Conflicts are detected at resolution time, not hidden by the merge
        let base = AutosaveSettings {
            only: Some(vec!["a".to_string()]),
            ..Default::default()
        };
        let over = AutosaveSettings {
            except: Some(vec!["b".to_string()]),
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.only.is_some());
        assert!(merged.except.is_some());
    }

    #[test]
    fn test_yaml_omits_unset_fields() {
        let settings = AutosaveSettings {
            save_delay_ms: Some(250),
            ..Default::default()
        };
        let yaml = serde_yaml_ng::to_string(&settings).unwrap();
        assert_eq!(yaml.trim(), "save_delay_ms: 250");

        let parsed: AutosaveSettings = serde_yaml_ng::from_str("except: [draft]").unwrap();
        assert_eq!(parsed.except, Some(vec!["draft".to_string()]));
        assert_eq!(parsed.save_delay_ms, None);
    }
}
