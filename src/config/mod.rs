use crate::global;
use crate::models::{AutosaveSettings, Model};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the settings file inside the configuration directory
pub const SETTINGS_FILE_NAME: &str = "autosave.yaml";

/// Default prefix of environment variable overrides (`AUTOSAVE_SAVE_DELAY_MS`, ...)
pub const DEFAULT_ENV_PREFIX: &str = "AUTOSAVE";

/// Configuration manager for loading and saving autosave settings.
///
/// Settings are read from `autosave.yaml` in the configuration directory and
/// then overridden by environment variables:
/// - `AUTOSAVE_SAVE_DELAY_MS`: quiet period in milliseconds
/// - `AUTOSAVE_ONLY`: comma-separated list of tracked properties
/// - `AUTOSAVE_EXCEPT`: comma-separated list of untracked properties
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `autosave.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        Self::with_env_prefix(config_dir, DEFAULT_ENV_PREFIX)
    }

    /// Create a ConfigManager that reads environment overrides with `env_prefix`
    pub fn with_env_prefix<P: AsRef<Utf8Path>>(config_dir: P, env_prefix: &str) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE_NAME),
            config_dir,
            env_prefix: env_prefix.to_string(),
        })
    }

    /// Load the settings file merged with environment overrides.
    ///
    /// # Returns
    /// The loaded settings; fields absent from both sources stay unset
    pub fn load_settings(&self) -> Result<AutosaveSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Autosave settings not found at {}, using defaults",
                self.settings_path
            );
        }

        let settings: AutosaveSettings = Config::builder()
            .add_source(
                File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("only")
                    .with_list_parse_key("except"),
            )
            .build()
            .with_context(|| format!("Failed to read autosave settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse autosave settings: {}", self.settings_path))?;

        tracing::info!("Loaded autosave settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the settings file.
    ///
    /// # Arguments
    /// * `settings` - The settings to write; unset fields are omitted
    pub fn save_settings(&self, settings: &AutosaveSettings) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(settings)
            .context("Failed to serialize autosave settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write autosave settings: {}", self.settings_path))?;

        tracing::info!("Saved autosave settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the settings and install them as the global options for `M`.
    ///
    /// A save function already configured globally for `M` is kept.
    pub fn configure_global<M: Model>(&self) -> Result<AutosaveSettings> {
        let settings = self.load_settings()?;
        global::configure_settings::<M>(settings.clone()).with_context(|| {
            format!("Invalid autosave settings in {}", self.settings_path)
        })?;
        Ok(settings)
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
