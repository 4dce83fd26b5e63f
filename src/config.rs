use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "loggraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log: LogConfig,
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Level filter used when RUST_LOG is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Log window size
    pub max_commits: usize,
    /// Commits (or id prefixes) that never disappear into a fragment
    pub pinned: Vec<String>,
    /// Collapse every fragment after loading
    pub collapse: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_commits: 500,
            pinned: Vec::new(),
            collapse: false,
        }
    }
}

impl GraphConfig {
    pub fn is_pinned(&self, commit: &str) -> bool {
        self.pinned
            .iter()
            .any(|p| !p.is_empty() && commit.starts_with(p.as_str()))
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Explicit path must exist; otherwise fall back to `loggraph.toml` in
    /// `dir` if present, else defaults
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
