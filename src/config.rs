//! Scan configuration.
//!
//! A configuration file is optional; `apimap scan` works on a bare tree with
//! the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["apimap.yaml", ".apimap.yaml"];

/// Scan configuration, usually loaded from `apimap.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to exclude from the walk
    /// (e.g. "**/generated/**"). Matched against paths relative to the root.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Whether to follow symlinks while walking (default: true).
    #[serde(default)]
    pub follow_links: Option<bool>,
    /// Whether to descend into hidden directories (default: false).
    #[serde(default)]
    pub include_hidden: Option<bool>,
}

impl ScanConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ScanConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Look for a configuration file in the current directory.
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    pub fn should_follow_links(&self) -> bool {
        self.follow_links.unwrap_or(true)
    }

    pub fn should_include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(false)
    }

    /// Compile `excluded_paths` into a matcher.
    ///
    /// `validate` reports pattern errors up front; this re-surfaces them for
    /// callers that skipped validation.
    pub fn build_excludes(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// Validate a configuration, reporting the first problem found.
pub fn validate(config: &ScanConfig) -> anyhow::Result<()> {
    for pattern in &config.excluded_paths {
        Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }
    Ok(())
}
