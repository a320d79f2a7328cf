//! Edge case and error scenario tests

use std::fs;
use std::path::PathBuf;
use playsync_config::{Config, ConfigError, ConfigManager, WatchRoots};
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(matches!(manager.load(), Err(ConfigError::ParseError { .. })));
    Ok(())
}

#[test]
fn test_corrupted_json_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json")?;

    let manager = ConfigManager::with_path(path)?;
    assert!(matches!(
        manager.load(),
        Err(ConfigError::JsonParseError { .. })
    ));
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let nested_path = temp_dir.path().join("a").join("b").join("c");
    let manager = ConfigManager::with_directory(nested_path)?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());

    Ok(())
}

#[test]
fn test_invalid_values_load_with_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(
        manager.config_path(),
        r#"
remote_endpoint = "not a url"
"#,
    )?;

    let config = manager.load()?;
    assert_eq!(config.remote_endpoint, "not a url");
    assert!(!manager.validate()?.is_empty());

    Ok(())
}

#[test]
fn test_special_characters_in_roots() {
    let config = Config {
        watch_roots: WatchRoots::many([
            "/path/with spaces/clips",
            "/path/with-dashes/clips",
            "/path/with.dots/clips",
            "/path/æøå/klip",
        ]),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_extension_rejected() {
    let config = Config {
        supported_extensions: vec![".mp4".to_string(), "  ".to_string()],
        ..Config::default()
    };
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "supported_extensions[1]");
}

#[test]
fn test_missing_roots_reported_not_rejected() {
    let config = Config {
        watch_roots: WatchRoots::many([
            PathBuf::from("/definitely/missing/one"),
            PathBuf::from("/definitely/missing/two"),
        ]),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.check_roots().len(), 2);
}

#[test]
fn test_concurrent_config_loads() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    let manager = ConfigManager::with_directory(config_dir.clone())?;
    manager.initialize()?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                if let Ok(mgr) = ConfigManager::with_directory(dir) {
                    for _ in 0..10 {
                        assert!(mgr.load().is_ok());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }

    Ok(())
}
