//! Error types for widecol
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Variants fall into four groups:
//! - validation (`InvalidRange`, `InvalidTtl`, `NullJoinValue`, `InvalidInput`):
//!   raised before any I/O is issued
//! - data integrity (`MalformedKey`, `JoinEntityNotFound`, `StaleEntity`):
//!   raised after a read, when stored data does not match expectations
//! - collaborator (`BatchCommit`, `Storage`, `Serialization`): propagated verbatim
//! - configuration (`InvalidConfig`, `Io`)
//!
//! None of these are retried by the library.

use thiserror::Error;

/// Result type alias for widecol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for widecol
#[derive(Debug, Error)]
pub enum Error {
    /// Range bounds are out of order or otherwise unusable
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// TTL was zero or negative
    #[error("Invalid TTL: {ttl} (must be strictly positive)")]
    InvalidTtl {
        /// The rejected TTL, in seconds
        ttl: i64,
    },

    /// A join column was asked to store a missing reference
    #[error("Cannot persist null join value for '{property}'")]
    NullJoinValue {
        /// Property or table the reference belongs to
        property: String,
    },

    /// A referenced entity does not exist and cascade was not enabled
    #[error("Join entity not found: {table}/{id}")]
    JoinEntityNotFound {
        /// Table of the referenced entity
        table: String,
        /// Debug rendering of the referenced identifier
        id: String,
    },

    /// Binary composite key does not match the expected layout
    #[error("Malformed composite key: {0}")]
    MalformedKey(String),

    /// Entity vanished from storage between load and refresh
    #[error("Stale entity: {table}/{id} no longer exists")]
    StaleEntity {
        /// Table of the entity
        table: String,
        /// Debug rendering of the identifier
        id: String,
    },

    /// Storage collaborator rejected a staged batch
    #[error("Batch commit failed: {0}")]
    BatchCommit(String),

    /// Storage collaborator failure (read, write, scan)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system failure (configuration files)
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid mapping or engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid argument that is not covered by a more specific variant
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an `InvalidRange` error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Error::InvalidRange(message.into())
    }

    /// Create a `MalformedKey` error
    pub fn malformed_key(message: impl Into<String>) -> Self {
        Error::MalformedKey(message.into())
    }

    /// Create a `Storage` error
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Create a `BatchCommit` error
    pub fn batch_commit(message: impl Into<String>) -> Self {
        Error::BatchCommit(message.into())
    }

    /// Create an `Io` error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(message.into())
    }

    /// Create an `InvalidConfig` error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// True for errors raised before any I/O was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidRange(_)
                | Error::InvalidTtl { .. }
                | Error::NullJoinValue { .. }
                | Error::InvalidInput(_)
        )
    }

    /// True for errors caused by stored data that does not match expectations
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Error::MalformedKey(_) | Error::JoinEntityNotFound { .. } | Error::StaleEntity { .. }
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
