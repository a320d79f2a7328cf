//! Watch behavior configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How watched roots are observed and when a file counts as settled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiescence window before a new or changed file is reported (0 = report immediately)
    pub stability_threshold_ms: u64,

    /// How often pending files are re-checked while settling
    pub poll_interval_ms: u64,

    /// Skip files and directories whose name starts with a dot
    pub ignore_hidden: bool,

    /// Report files already present under each root when the session starts
    pub initial_scan: bool,

    /// Watch subdirectories of each root
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            stability_threshold_ms: 2000,
            poll_interval_ms: 100,
            ignore_hidden: true,
            initial_scan: true,
            recursive: true,
        }
    }
}

impl WatchConfig {
    pub fn stability_threshold(&self) -> Duration {
        Duration::from_millis(self.stability_threshold_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl ConfigSection for WatchConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::in_range(self.poll_interval_ms, 10, 10_000, "watch.poll_interval_ms"),
            Validator::in_range(
                self.stability_threshold_ms,
                0,
                600_000,
                "watch.stability_threshold_ms",
            ),
        ];

        Validator::collect_errors(results)
    }
}
