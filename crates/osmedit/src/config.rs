//! # Configuration
//!
//! Editor settings are managed by [`confique`], which handles layered loading
//! from a TOML file, environment variables and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `OSMEDIT_MAX_WAY_NODES`, `OSMEDIT_DEPRECATED_PATH`, etc.
//! 2. **Config file**: `osmedit.toml` in the given directory (missing file is fine).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! [`EditorConfig::default_dir`] gives the OS-appropriate directory (via the
//! `directories` crate) for callers that don't have their own.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `max_tag_value_chars` | `255` | Length limit for merged tag values, in code points |
//! | `max_way_nodes` | `2000` | Most nodes a way may have on upload |
//! | `deprecated_path` | unset | JSON deprecation table |
//! | `discard_path` | unset | JSON discard configuration |

use crate::data;
use crate::error::Result;
use crate::tags::{DeprecationRule, DiscardConfig, MAX_TAG_VALUE_CHARS};
use crate::validations::api_limits::DEFAULT_MAX_WAY_NODES;
use confique::Config;
use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "osmedit.toml";

/// Editor configuration, stored in `osmedit.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Merged tag values are truncated to this many code points.
    #[config(default = 255, env = "OSMEDIT_MAX_TAG_VALUE_CHARS")]
    pub max_tag_value_chars: usize,

    /// Ways with more nodes than this are rejected by the upstream API.
    #[config(default = 2000, env = "OSMEDIT_MAX_WAY_NODES")]
    pub max_way_nodes: usize,

    /// Deprecation rule table (JSON). Relative paths resolve against the
    /// config directory.
    #[config(env = "OSMEDIT_DEPRECATED_PATH")]
    pub deprecated_path: Option<PathBuf>,

    /// Discard configuration (JSON).
    #[config(env = "OSMEDIT_DISCARD_PATH")]
    pub discard_path: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_tag_value_chars: MAX_TAG_VALUE_CHARS,
            max_way_nodes: DEFAULT_MAX_WAY_NODES,
            deprecated_path: None,
            discard_path: None,
        }
    }
}

/// Rule tables named by a config. Unconfigured tables are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    pub deprecated: Vec<DeprecationRule>,
    pub discard: DiscardConfig,
}

impl EditorConfig {
    /// Loads `dir/osmedit.toml` layered under the environment.
    pub fn load(dir: &Path) -> Result<Self> {
        let file = dir.join(CONFIG_FILE);
        debug!(path = file.display().to_string().as_str(); "Loading config");
        let mut config = EditorConfig::builder().env().file(&file).load()?;
        config.resolve_paths(dir);
        Ok(config)
    }

    /// OS-appropriate config directory, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("org", "osmedit", "osmedit").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn resolve_paths(&mut self, dir: &Path) {
        for path in [&mut self.deprecated_path, &mut self.discard_path]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }

    pub fn load_rules(&self) -> Result<Rules> {
        let deprecated = match &self.deprecated_path {
            Some(path) => data::load_deprecated(path)?,
            None => Vec::new(),
        };
        let discard = match &self.discard_path {
            Some(path) => data::load_discard(path)?,
            None => DiscardConfig::default(),
        };
        Ok(Rules {
            deprecated,
            discard,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.max_tag_value_chars, 255);
        assert_eq!(config.max_way_nodes, 2000);
        assert!(config.deprecated_path.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_way_nodes, 2000);
        assert_eq!(config.max_tag_value_chars, 255);
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let contents = toml::to_string(&EditorConfig {
            max_way_nodes: 50,
            deprecated_path: Some(PathBuf::from("deprecated.json")),
            ..Default::default()
        })
        .unwrap();
        fs::write(dir.path().join(CONFIG_FILE), contents).unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_way_nodes, 50);
        assert_eq!(config.max_tag_value_chars, 255);
        assert_eq!(
            config.deprecated_path,
            Some(dir.path().join("deprecated.json"))
        );
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "max_way_nodes = \"many\"\n").unwrap();
        assert!(EditorConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_rules_unconfigured_is_empty() {
        let rules = EditorConfig::default().load_rules().unwrap();
        assert!(rules.deprecated.is_empty());
        assert!(rules.discard.is_empty());
    }

    #[test]
    fn test_load_rules_reads_assets() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("deprecated.json"),
            r#"[{"old": {"highway": "no"}}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("discard.json"), r#"{"created_by": true}"#).unwrap();

        let config = EditorConfig {
            deprecated_path: Some(dir.path().join("deprecated.json")),
            discard_path: Some(dir.path().join("discard.json")),
            ..Default::default()
        };
        let rules = config.load_rules().unwrap();
        assert_eq!(rules.deprecated.len(), 1);
        assert!(rules.discard.should_discard("created_by", "JOSM"));
    }
}
