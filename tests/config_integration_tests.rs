//! Integration tests for ConfigManager and the global options layer
//!
//! These tests verify:
//! - Settings files round through the configuration directory
//! - Environment variables override the settings file
//! - Global options apply to proxies created afterwards
//! - Instance options win over global options
//!
//! Each test that touches the global layer uses its own model type, since the
//! layer is process-wide and tests run concurrently.

use autosave::{
    AutosaveError, AutosaveOptions, AutosaveProxy, AutosaveSettings, ConfigManager, Model, Record,
    global,
};
use camino::Utf8PathBuf;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

/// Distinct value types give each test a private slot in the global layer
macro_rules! model_type {
    ($name:ident) => {
        #[allow(dead_code)]
        #[derive(Clone, Debug, PartialEq)]
        struct $name(&'static str);
    };
}

model_type!(GlobalDelayValue);
model_type!(InstanceWinsValue);
model_type!(FileGlobalValue);
model_type!(CrossLayerValue);

#[test]
fn test_create_config_manager_creates_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("nested").join("dir");

    let manager = ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
    assert_eq!(manager.config_dir(), &nested);
}

#[test]
fn test_settings_file_format() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "AUTOSAVE_FORMAT_TEST").unwrap();

    fs::write(
        manager.settings_path(),
        "save_delay_ms: 1500\nexcept:\n  - cursor\n  - selection\n",
    )
    .unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.save_delay(), Some(Duration::from_millis(1500)));
    assert_eq!(
        settings.except,
        Some(vec!["cursor".to_string(), "selection".to_string()])
    );
    assert_eq!(settings.only, None);
}

#[test]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "AUTOSAVE_ENV_TEST").unwrap();

    manager
        .save_settings(&AutosaveSettings {
            save_delay_ms: Some(1000),
            ..Default::default()
        })
        .unwrap();

    // SAFETY: this prefix is only read by this test
    unsafe {
        std::env::set_var("AUTOSAVE_ENV_TEST_SAVE_DELAY_MS", "250");
        std::env::set_var("AUTOSAVE_ENV_TEST_ONLY", "title,body");
    }

    let settings = manager.load_settings().unwrap();

    unsafe {
        std::env::remove_var("AUTOSAVE_ENV_TEST_SAVE_DELAY_MS");
        std::env::remove_var("AUTOSAVE_ENV_TEST_ONLY");
    }

    assert_eq!(settings.save_delay_ms, Some(250));
    assert_eq!(
        settings.only,
        Some(vec!["title".to_string(), "body".to_string()])
    );
}

#[tokio::test]
async fn test_global_options_apply_to_new_proxies() {
    type M = Record<GlobalDelayValue>;

    let before = AutosaveProxy::<M>::create(None, AutosaveOptions::new()).unwrap();

    global::configure(
        AutosaveOptions::<M>::new()
            .save_delay(Duration::from_millis(42))
            .only(["title"]),
    )
    .unwrap();

    let after = AutosaveProxy::<M>::create(None, AutosaveOptions::new()).unwrap();

    // Options are resolved once, at construction
    assert_eq!(before.options().save_delay(), Duration::from_secs(1));
    assert_eq!(after.options().save_delay(), Duration::from_millis(42));
    assert!(after.options().filter().is_tracked("title"));
    assert!(!after.options().filter().is_tracked("body"));
}

#[tokio::test(start_paused = true)]
async fn test_instance_options_win_over_global() {
    type M = Record<InstanceWinsValue>;

    let global_saves = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&global_saves);
    global::configure(
        AutosaveOptions::<M>::new()
            .save_delay(Duration::from_millis(500))
            .save(move |_| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            }),
    )
    .unwrap();

    let record = Arc::new(Record::new());
    let proxy = AutosaveProxy::create(
        Some(Arc::clone(&record)),
        AutosaveOptions::new().save_delay(Duration::from_millis(10)),
    )
    .unwrap();

    proxy.set("k", InstanceWinsValue("v")).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Instance delay wins, global save function still applies
    assert_eq!(global_saves.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(record.save_count(), 0);
    assert_eq!(record.get("k"), Some(InstanceWinsValue("v")));
}

#[tokio::test]
async fn test_configure_global_from_file() {
    type M = Record<FileGlobalValue>;

    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::with_env_prefix(&config_path, "AUTOSAVE_GLOBAL_TEST").unwrap();
    fs::write(manager.settings_path(), "save_delay_ms: 5\nonly: [title]\n").unwrap();

    let settings = manager.configure_global::<M>().unwrap();
    assert_eq!(settings.save_delay_ms, Some(5));

    let proxy = AutosaveProxy::<M>::create(None, AutosaveOptions::new()).unwrap();
    assert_eq!(proxy.options().save_delay(), Duration::from_millis(5));
    assert!(!proxy.options().filter().is_tracked("body"));
}

#[tokio::test]
async fn test_conflict_across_global_and_instance() {
    type M = Record<CrossLayerValue>;

    global::configure(AutosaveOptions::<M>::new().only(["title"])).unwrap();

    let result = AutosaveProxy::<M>::create(None, AutosaveOptions::new().except(["cursor"]));
    assert!(matches!(result, Err(AutosaveError::ConflictingFilters)));
}
