//! Configuration resolution and graceful degradation tests
//!
//! Tests that touch CELLAR_CONFIG or CELLAR_ROOT_FOLDER are marked #[serial]
//! so environment mutations never race.

use cellar_common::config::{
    load_config, resolve_config_path, RootFolderInitializer, RootFolderResolver, TomlConfig,
    CONFIG_ENV_VAR, ROOT_FOLDER_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_config_path_takes_priority_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let resolved = resolve_config_path(Some(&cli));
    assert_eq!(resolved, Some(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_config_path_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_config_reads_explicit_file() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/cellar"

        [logging]
        level = "debug"

        [advisor]
        top_k = 4
        rotation_window_days = 2
        "#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/cellar")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.advisor.top_k, 4);
    assert_eq!(config.advisor.rotation_window_days, 2);
    assert_eq!(config.advisor.history_window_days, 7);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    assert!(load_config(Some(&missing)).is_err());
}

#[test]
fn test_invalid_window_rejected_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[advisor]\nhistory_window_days = 0\n").unwrap();

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
#[serial]
fn test_root_folder_priority_order() {
    env::remove_var(ROOT_FOLDER_ENV_VAR);

    // Priority 3: TOML value
    let resolver = RootFolderResolver::new().with_toml_value(Some(PathBuf::from("/toml/root")));
    assert_eq!(resolver.resolve(), PathBuf::from("/toml/root"));

    // Priority 2: environment beats TOML
    env::set_var(ROOT_FOLDER_ENV_VAR, "/env/root");
    assert_eq!(resolver.resolve(), PathBuf::from("/env/root"));

    // Priority 1: CLI beats everything
    let resolver = resolver.with_cli_arg(Some(PathBuf::from("/cli/root")));
    assert_eq!(resolver.resolve(), PathBuf::from("/cli/root"));

    env::remove_var(ROOT_FOLDER_ENV_VAR);
}

#[test]
#[serial]
fn test_root_folder_falls_back_to_default() {
    env::remove_var(ROOT_FOLDER_ENV_VAR);

    let resolved = RootFolderResolver::new().resolve();
    assert!(!resolved.as_os_str().is_empty());
    assert_eq!(resolved, cellar_common::config::default_root_folder());
}

#[test]
fn test_initializer_creates_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("cellar");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("cellar.db"));
}
