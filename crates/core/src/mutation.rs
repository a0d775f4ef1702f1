//! Staged column mutations
//!
//! A `Mutation` is one write or delete against one row, as accumulated by a
//! batch context and handed to the storage collaborator in a single
//! `commit_batch` call.

use std::time::Duration;

use crate::types::RowKey;

/// One staged column write or delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write one column
    Put {
        /// Owning row
        row: RowKey,
        /// Encoded column name
        column: Vec<u8>,
        /// Encoded value
        value: Vec<u8>,
        /// Optional time-to-live
        ttl: Option<Duration>,
    },
    /// Delete one column
    Delete {
        /// Owning row
        row: RowKey,
        /// Encoded column name
        column: Vec<u8>,
    },
    /// Delete every column between two inclusive boundaries (empty = open)
    DeleteRange {
        /// Owning row
        row: RowKey,
        /// Low boundary
        low: Vec<u8>,
        /// High boundary
        high: Vec<u8>,
    },
}

impl Mutation {
    /// Row the mutation targets
    pub fn row(&self) -> &RowKey {
        match self {
            Mutation::Put { row, .. } | Mutation::Delete { row, .. } | Mutation::DeleteRange { row, .. } => row,
        }
    }

    /// True for `Put`
    pub fn is_put(&self) -> bool {
        matches!(self, Mutation::Put { .. })
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Put { .. } => "put",
            Mutation::Delete { .. } => "delete",
            Mutation::DeleteRange { .. } => "delete_range",
        }
    }
}
