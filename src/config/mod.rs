//! Configuration system for ypath.
//!
//! This module provides the configuration structure for the `ypath` command
//! with sensible defaults and support for serialization/deserialization via
//! serde. Configuration is loaded from a TOML file and can be overridden by
//! command-line arguments.
//!
//! # Example
//!
//! ```
//! use ypath::config::{Config, OutputFormat};
//!
//! // Use default configuration
//! let config = Config::default();
//! assert!(config.follow_aliases);
//! assert_eq!(config.max_recursion_depth, 256);
//!
//! // Create custom configuration
//! let custom = Config {
//!     output_format: OutputFormat::Json,
//!     ..Config::default()
//! };
//! ```

use crate::ypath::executor::{ExecConfig, DEFAULT_MAX_RECURSION_DEPTH};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How matched nodes are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One YAML document per match
    #[default]
    Yaml,
    /// A JSON array of all matches
    Json,
}

/// Configuration for the ypath command.
///
/// All fields have sensible defaults via `Config::default()`, and missing
/// fields in a config file fall back to those defaults.
///
/// # Fields
///
/// * `follow_aliases` - Replace aliases reached by a query with their anchored node (default: true)
/// * `max_recursion_depth` - Evaluation depth limit, guards `**` on alias cycles (default: 256)
/// * `output_format` - "yaml" or "json" (default: "yaml")
/// * `show_paths` - Print the path of each match instead of its content (default: false)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Replace aliases reached by a query with their anchored node
    #[serde(default = "default_follow_aliases")]
    pub follow_aliases: bool,

    /// Evaluation depth limit
    #[serde(default = "default_max_recursion_depth")]
    pub max_recursion_depth: usize,

    /// Output format for matched nodes
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Print the path of each match instead of its content
    #[serde(default)]
    pub show_paths: bool,
}

/// Returns the default for following aliases.
fn default_follow_aliases() -> bool {
    true
}

/// Returns the default evaluation depth limit.
fn default_max_recursion_depth() -> usize {
    DEFAULT_MAX_RECURSION_DEPTH
}

impl Default for Config {
    /// Creates a new configuration with default values.
    ///
    /// # Default Values
    ///
    /// * `follow_aliases`: true
    /// * `max_recursion_depth`: 256
    /// * `output_format`: yaml
    /// * `show_paths`: false
    fn default() -> Self {
        Self {
            follow_aliases: default_follow_aliases(),
            max_recursion_depth: default_max_recursion_depth(),
            output_format: OutputFormat::default(),
            show_paths: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/ypath/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("ypath");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring config file: {:#}", err);
                Self::default()
            }
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(config_path)
    }

    /// Saves configuration to a specific file, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// The executor options this configuration selects.
    pub fn exec_config(&self) -> ExecConfig {
        ExecConfig {
            follow_aliases: self.follow_aliases,
            max_recursion_depth: self.max_recursion_depth,
        }
    }
}
