//! Tests for engine_paths module.

use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn test_home_env_override() {
    let dir = tempdir().unwrap();
    let home = dir.path().join("custom-home");
    std::env::set_var(HOME_ENV, &home);

    let resolved = engine_home_dir().unwrap();
    assert_eq!(resolved, home);
    assert!(home.is_dir());

    std::env::remove_var(HOME_ENV);
}

#[test]
#[serial]
fn test_subdirectories_are_created() {
    let dir = tempdir().unwrap();
    std::env::set_var(HOME_ENV, dir.path());

    let data = data_dir().unwrap();
    let logs = logs_dir().unwrap();
    let config = config_path().unwrap();

    assert_eq!(data, dir.path().join("data"));
    assert!(data.is_dir());
    assert_eq!(logs, dir.path().join("logs"));
    assert!(logs.is_dir());
    assert_eq!(config, dir.path().join("config.yaml"));
    assert!(!config.exists());

    std::env::remove_var(HOME_ENV);
}

#[test]
#[serial]
fn test_empty_override_falls_back_to_home() {
    std::env::set_var(HOME_ENV, "");
    let expected = dirs::home_dir().map(|h| h.join(ENGINE_DIR));
    assert!(expected.is_some(), "test environment needs a home directory");

    let resolved = engine_home_dir().unwrap();
    assert_eq!(Some(resolved), expected);

    std::env::remove_var(HOME_ENV);
}
