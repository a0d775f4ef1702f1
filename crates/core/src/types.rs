//! Core identity types for widecol
//!
//! This module defines:
//! - RowKey: address of one wide row (logical table + row identifier)
//! - Column: a raw (name, value) pair as returned by a scan

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of one wide row
///
/// A row is identified by the logical table (column family) it lives in and
/// an opaque binary row identifier. Entity rows use the bincode encoding of
/// the entity's primary key; external wide maps use their own row identifier
/// in their own table.
///
/// Ordering is table first, then row bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    /// Logical table name
    pub table: String,
    /// Binary row identifier
    pub row: Vec<u8>,
}

impl RowKey {
    /// Create a new row key
    pub fn new(table: impl Into<String>, row: impl Into<Vec<u8>>) -> Self {
        Self {
            table: table.into(),
            row: row.into(),
        }
    }

    /// Create a row key whose identifier is the bincode encoding of `id`
    pub fn for_id<T: Serialize + ?Sized>(table: impl Into<String>, id: &T) -> crate::Result<Self> {
        Ok(Self::new(table, bincode::serialize(id)?))
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.table)?;
        for byte in &self.row {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A raw column: binary name (an encoded composite key) and binary value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Encoded column name
    pub name: Vec<u8>,
    /// Encoded column value
    pub value: Vec<u8>,
}

impl Column {
    /// Create a new column
    pub fn new(name: Vec<u8>, value: Vec<u8>) -> Self {
        Self { name, value }
    }
}
