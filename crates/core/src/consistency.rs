//! Consistency levels and the per-operation consistency policy
//!
//! The core never interprets a level. It resolves one from the
//! [`ConsistencyPolicy`] for every read or write and forwards it to the
//! storage collaborator unchanged.
//!
//! The policy is a plain value passed into each wide map and repository;
//! there is no process-wide registry of levels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Consistency level forwarded to the storage collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Any replica, including hinted handoff
    Any,
    /// One replica
    One,
    /// Two replicas
    Two,
    /// Three replicas
    Three,
    /// Majority of replicas
    Quorum,
    /// Majority of replicas in the local datacenter
    LocalQuorum,
    /// Majority of replicas in every datacenter
    EachQuorum,
    /// Every replica
    All,
}

impl ConsistencyLevel {
    /// Lowercase name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "any",
            ConsistencyLevel::One => "one",
            ConsistencyLevel::Two => "two",
            ConsistencyLevel::Three => "three",
            ConsistencyLevel::Quorum => "quorum",
            ConsistencyLevel::LocalQuorum => "local_quorum",
            ConsistencyLevel::EachQuorum => "each_quorum",
            ConsistencyLevel::All => "all",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(ConsistencyLevel::Any),
            "one" => Ok(ConsistencyLevel::One),
            "two" => Ok(ConsistencyLevel::Two),
            "three" => Ok(ConsistencyLevel::Three),
            "quorum" => Ok(ConsistencyLevel::Quorum),
            "local_quorum" => Ok(ConsistencyLevel::LocalQuorum),
            "each_quorum" => Ok(ConsistencyLevel::EachQuorum),
            "all" => Ok(ConsistencyLevel::All),
            other => Err(Error::invalid_config(format!(
                "unknown consistency level '{}'",
                other
            ))),
        }
    }
}

/// Read/write consistency levels, with per-table overrides
///
/// # Example
///
/// ```
/// use widecol_core::{ConsistencyLevel, ConsistencyPolicy};
///
/// let policy = ConsistencyPolicy::new(ConsistencyLevel::One, ConsistencyLevel::All)
///     .with_read_override("timeline", ConsistencyLevel::Quorum);
///
/// assert_eq!(policy.read_level("timeline"), ConsistencyLevel::Quorum);
/// assert_eq!(policy.read_level("users"), ConsistencyLevel::One);
/// assert_eq!(policy.write_level("timeline"), ConsistencyLevel::All);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyPolicy {
    default_read: ConsistencyLevel,
    default_write: ConsistencyLevel,
    read_overrides: HashMap<String, ConsistencyLevel>,
    write_overrides: HashMap<String, ConsistencyLevel>,
}

impl ConsistencyPolicy {
    /// Create a policy with the given default levels and no overrides
    pub fn new(default_read: ConsistencyLevel, default_write: ConsistencyLevel) -> Self {
        Self {
            default_read,
            default_write,
            read_overrides: HashMap::new(),
            write_overrides: HashMap::new(),
        }
    }

    /// Override the read level for one table
    pub fn with_read_override(mut self, table: impl Into<String>, level: ConsistencyLevel) -> Self {
        self.read_overrides.insert(table.into(), level);
        self
    }

    /// Override the write level for one table
    pub fn with_write_override(
        mut self,
        table: impl Into<String>,
        level: ConsistencyLevel,
    ) -> Self {
        self.write_overrides.insert(table.into(), level);
        self
    }

    /// Read level used when a table has no override
    pub fn default_read(&self) -> ConsistencyLevel {
        self.default_read
    }

    /// Write level used when a table has no override
    pub fn default_write(&self) -> ConsistencyLevel {
        self.default_write
    }

    /// Level for reads against `table`
    pub fn read_level(&self, table: &str) -> ConsistencyLevel {
        self.read_overrides
            .get(table)
            .copied()
            .unwrap_or(self.default_read)
    }

    /// Level for writes against `table`
    pub fn write_level(&self, table: &str) -> ConsistencyLevel {
        self.write_overrides
            .get(table)
            .copied()
            .unwrap_or(self.default_write)
    }
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self::new(ConsistencyLevel::One, ConsistencyLevel::All)
    }
}
