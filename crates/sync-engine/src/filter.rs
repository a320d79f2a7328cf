// crates/sync-engine/src/filter.rs
//! File type filtering

use std::collections::HashSet;
use std::path::Path;

/// Decides which files are media worth mirroring
///
/// Extensions are compared case-insensitively. Configured entries may be
/// given with or without the leading dot.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: HashSet<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| ext.len() > 1)
            .collect();

        Self { extensions }
    }

    /// Returns true if the path's extension is in the configured set
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&format!(".{}", e.to_lowercase())))
            .unwrap_or(false)
    }

    /// Configured extensions, lowercase with a leading dot, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
