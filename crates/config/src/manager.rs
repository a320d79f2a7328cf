//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, WatchRoots};
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration manager
///
/// Owns the location of the config file and turns its contents into a
/// ready-to-use `Config`: relative roots resolved, environment overrides applied.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a config manager that keeps `config.toml` next to the executable
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::executable_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        Ok(Self {
            persistence: ConfigPersistence::new(config_path),
            config_dir,
        })
    }

    /// Creates a config manager for an explicit config file
    pub fn with_path(config_path: PathBuf) -> ConfigResult<Self> {
        let config_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        Ok(Self {
            persistence: ConfigPersistence::new(config_path),
            config_dir,
        })
    }

    fn executable_dir() -> ConfigResult<PathBuf> {
        let exe = std::env::current_exe().map_err(|e| ConfigError::PathResolutionError {
            reason: format!("Could not locate the running executable: {}", e),
        })?;

        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Executable has no parent directory".to_string(),
            })
    }

    /// Returns the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> PathBuf {
        self.persistence.config_path().to_path_buf()
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// Relative watch roots are resolved against the config directory and
    /// environment overrides are applied.
    pub fn load(&self) -> ConfigResult<Config> {
        let mut config = self.persistence.load()?;
        Self::apply_env_overrides(&mut config);
        config.resolve_roots(&self.config_dir);
        Ok(config)
    }

    /// Loads the configuration, writing a default file first if none exists
    pub fn load_or_create(&self) -> ConfigResult<Config> {
        if !self.persistence.exists() {
            if let Err(e) = self.persistence.generate_default() {
                log::error!(
                    "Failed to create default config at {}: {}",
                    self.config_path().display(),
                    e
                );
            }
        }
        self.load()
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Generates a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.persistence.exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.persistence.generate_default()?;
        Ok(true)
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Merges environment variable overrides into the config
    ///
    /// - `PLAYSYNC_REMOTE_ENDPOINT`: base URL of the remote API
    /// - `PLAYSYNC_WATCH_ROOTS`: roots separated by the platform path-list separator
    pub fn apply_env_overrides(config: &mut Config) {
        if let Ok(endpoint) = std::env::var("PLAYSYNC_REMOTE_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                log::info!("Remote endpoint override: {}", endpoint);
                config.remote_endpoint = endpoint;
            }
        }

        if let Some(roots) = std::env::var_os("PLAYSYNC_WATCH_ROOTS") {
            let roots: Vec<PathBuf> = std::env::split_paths(&roots)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !roots.is_empty() {
                log::info!("Watch roots override: {:?}", roots);
                config.watch_roots = WatchRoots::Many(roots);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_config_path() {
        let (temp_dir, manager) = setup_test_manager();
        assert_eq!(manager.config_path(), temp_dir.path().join("config.toml"));
        assert_eq!(manager.config_dir(), temp_dir.path());
    }

    #[test]
    fn test_initialize_creates_file_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());
        assert!(!manager.initialize().expect("Should not recreate"));
    }

    #[test]
    fn test_load_resolves_default_root_against_config_dir() {
        let (temp_dir, manager) = setup_test_manager();

        let config = manager.load().expect("Should load defaults");
        assert_eq!(config.roots(), vec![temp_dir.path().join("media")]);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let (_temp_dir, manager) = setup_test_manager();

        let config = manager.load_or_create().expect("Should load");
        assert!(manager.config_path().exists());
        assert_eq!(config.remote_endpoint, crate::DEFAULT_REMOTE_ENDPOINT);
    }

    #[test]
    fn test_with_path_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{ "folderToWatch": "clips", "vmixUrl": "http://studio:8088" }"#,
        )
        .expect("Should write");

        let manager = ConfigManager::with_path(config_path).expect("Should create manager");
        let config = manager.load().expect("Should load");

        assert_eq!(config.roots(), vec![temp_dir.path().join("clips")]);
        assert_eq!(config.remote_endpoint, "http://studio:8088");
    }
}
