//! Engine configuration via `widecol.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Consistency levels are named in lowercase (`"one"`, `"local_quorum"`,
//! ...) and resolved into a `ConsistencyPolicy` that is handed to each
//! wide map and repository.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use widecol_core::{ConsistencyLevel, ConsistencyPolicy, Error, Result};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "widecol.toml";

/// Read/write consistency levels, as they appear in the `[consistency]`
/// section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsistencyConfig {
    /// Default read level
    #[serde(default = "default_read")]
    pub read: String,
    /// Default write level
    #[serde(default = "default_write")]
    pub write: String,
    /// Per-table read levels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub read_overrides: BTreeMap<String, String>,
    /// Per-table write levels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub write_overrides: BTreeMap<String, String>,
}

fn default_read() -> String {
    "one".to_string()
}

fn default_write() -> String {
    "all".to_string()
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            read: default_read(),
            write: default_write(),
            read_overrides: BTreeMap::new(),
            write_overrides: BTreeMap::new(),
        }
    }
}

/// Engine configuration loaded from `widecol.toml`.
///
/// # Example
///
/// ```toml
/// page_size = 100
/// max_batch_size = 10000
///
/// [consistency]
/// read = "one"
/// write = "all"
///
/// [consistency.read_overrides]
/// timeline = "quorum"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WideColConfig {
    /// Page size of lazy range iterators.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Largest number of operations one batch may stage.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Consistency levels.
    #[serde(default)]
    pub consistency: ConsistencyConfig,
}

fn default_page_size() -> usize {
    100
}

fn default_max_batch_size() -> usize {
    10_000
}

impl Default for WideColConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_batch_size: default_max_batch_size(),
            consistency: ConsistencyConfig::default(),
        }
    }
}

impl WideColConfig {
    /// Check sizes and consistency level names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on a zero size or an unknown level.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_config("page_size must be greater than 0"));
        }
        if self.max_batch_size == 0 {
            return Err(Error::invalid_config(
                "max_batch_size must be greater than 0",
            ));
        }
        self.consistency_policy().map(|_| ())
    }

    /// Resolve the `[consistency]` section into a policy.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a level name is unknown.
    pub fn consistency_policy(&self) -> Result<ConsistencyPolicy> {
        let c = &self.consistency;
        let mut policy = ConsistencyPolicy::new(c.read.parse()?, c.write.parse()?);
        for (table, level) in &c.read_overrides {
            policy = policy.with_read_override(table.clone(), level.parse::<ConsistencyLevel>()?);
        }
        for (table, level) in &c.write_overrides {
            policy = policy.with_write_override(table.clone(), level.parse::<ConsistencyLevel>()?);
        }
        Ok(policy)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# widecol configuration
#
# Page size of lazy range iterators (default: 100).
# Each page is one range scan against the store.
page_size = 100

# Largest number of operations a batch may stage (default: 10000).
# A flush over this limit fails and commits nothing.
max_batch_size = 10000

# Consistency levels forwarded to the store:
#   any, one, two, three, quorum, local_quorum, each_quorum, all
[consistency]
read = "one"
write = "all"

# Per-table overrides.
# [consistency.read_overrides]
# timeline = "quorum"
# [consistency.write_overrides]
# timeline = "quorum"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: WideColConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::io(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::io(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
