//! PlaySync Configuration System
//!
//! Loads, validates and persists the settings of one synchronization session:
//! which directories to watch, where the remote playlist API lives, and which
//! file types count as media.
//!
//! # Architecture
//!
//! - **Trait-based sections**: `watch` and `remote` implement `ConfigSection`
//! - **Graceful degradation**: validation problems are reported as warnings on load
//! - **Atomic writes**: config files are never left in a corrupted state
//! - **TOML or JSON**: the format follows the file extension
//!
//! # Example
//!
//! ```rust
//! use playsync_config::{Config, WatchRoots};
//!
//! let config = Config {
//!     watch_roots: WatchRoots::many(["/media/server1", "/media/server2"]),
//!     ..Config::default()
//! };
//!
//! assert_eq!(config.roots().len(), 2);
//! assert!(config.validate().is_ok());
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

mod remote_config;
mod watch_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{ConfigManager, CONFIG_FILE_NAME};
pub use persistence::{ConfigFormat, ConfigPersistence};
pub use validation::{ConfigSection, Validator};

pub use remote_config::RemoteConfig;
pub use watch_config::WatchConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Default base URL of the remote control API
pub const DEFAULT_REMOTE_ENDPOINT: &str = "http://localhost:8088";

/// Media extensions accepted out of the box
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".mp4", ".mov", ".wmv", ".avi", ".mpg", ".mpeg", ".mxf", ".mts",
];

/// One or many watch roots
///
/// Config files may give a single path or a list of paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WatchRoots {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl WatchRoots {
    /// Builds a root list from any collection of paths
    pub fn many<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        WatchRoots::Many(roots.into_iter().map(Into::into).collect())
    }

    /// Returns the roots in configured order
    pub fn to_vec(&self) -> Vec<PathBuf> {
        match self {
            WatchRoots::One(root) => vec![root.clone()],
            WatchRoots::Many(roots) => roots.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            WatchRoots::One(_) => 1,
            WatchRoots::Many(roots) => roots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map_paths<F>(&mut self, mut f: F)
    where
        F: FnMut(&Path) -> PathBuf,
    {
        match self {
            WatchRoots::One(root) => *root = f(root),
            WatchRoots::Many(roots) => {
                for root in roots.iter_mut() {
                    *root = f(root);
                }
            }
        }
    }
}

impl Default for WatchRoots {
    fn default() -> Self {
        WatchRoots::One(PathBuf::from("media"))
    }
}

impl From<PathBuf> for WatchRoots {
    fn from(root: PathBuf) -> Self {
        WatchRoots::One(root)
    }
}

impl From<&str> for WatchRoots {
    fn from(root: &str) -> Self {
        WatchRoots::One(PathBuf::from(root))
    }
}

impl From<Vec<PathBuf>> for WatchRoots {
    fn from(roots: Vec<PathBuf>) -> Self {
        WatchRoots::Many(roots)
    }
}

/// Root configuration structure
///
/// Plain values come first so the TOML output keeps the sections at the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Directories whose media files are mirrored into remote playlists
    #[serde(alias = "folderToWatch", alias = "watchRoots")]
    pub watch_roots: WatchRoots,

    /// Base URL of the remote control API
    #[serde(alias = "vmixUrl", alias = "remoteEndpoint")]
    pub remote_endpoint: String,

    /// File extensions treated as media, with a leading dot
    #[serde(alias = "supportedExtensions")]
    pub supported_extensions: Vec<String>,

    /// Watch behavior
    pub watch: WatchConfig,

    /// Transport settings
    pub remote: RemoteConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the watch roots in configured order
    pub fn roots(&self) -> Vec<PathBuf> {
        self.watch_roots.to_vec()
    }

    /// Makes every relative watch root absolute against `base`
    pub fn resolve_roots(&mut self, base: &Path) {
        self.watch_roots.map_paths(|root| {
            if root.is_absolute() {
                root.to_path_buf()
            } else {
                base.join(root)
            }
        });
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = Vec::new();

        if self.watch_roots.is_empty() {
            results.push(Err(ValidationError::new(
                "watch_roots",
                "at least one root is required",
            )));
        }
        for (i, root) in self.roots().iter().enumerate() {
            if root.as_os_str().is_empty() {
                results.push(Err(ValidationError::new(
                    format!("watch_roots[{}]", i),
                    "must not be empty",
                )));
            }
        }

        results.push(Validator::http_url(&self.remote_endpoint, "remote_endpoint"));

        for (i, ext) in self.supported_extensions.iter().enumerate() {
            results.push(Validator::not_empty(
                ext,
                &format!("supported_extensions[{}]", i),
            ));
        }

        let mut errors = match Validator::collect_errors(results) {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        if let Err(mut e) = self.watch.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.remote.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reports roots that do not exist or are not directories
    ///
    /// Missing roots are skipped by the watcher rather than treated as fatal,
    /// so this is only used for warnings.
    pub fn check_roots(&self) -> Vec<ValidationError> {
        self.roots()
            .iter()
            .enumerate()
            .filter_map(|(i, root)| {
                Validator::is_directory(root, &format!("watch_roots[{}]", i)).err()
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            watch_roots: WatchRoots::default(),
            remote_endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            watch: WatchConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}
