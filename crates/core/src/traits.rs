//! Storage collaborator trait
//!
//! This module defines the `ColumnStore` trait: the column read/write/
//! range-scan primitives the wide map layer is built on. Implementations
//! decide replication, durability and conflict resolution; the core only
//! forwards a `ConsistencyLevel` with every call and never interprets it.

use std::time::Duration;

use crate::consistency::ConsistencyLevel;
use crate::error::Result;
use crate::mutation::Mutation;
use crate::types::{Column, RowKey};

/// Sorted wide-column storage
///
/// Within a row, columns are ordered by unsigned lexicographic comparison of
/// their binary names. Range boundaries are inclusive byte strings; an empty
/// boundary means "open" on that side.
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). No client-side locking is done
/// by callers; concurrent writes to one column resolve last-write-wins.
///
/// # Examples
///
/// ```
/// use widecol_core::traits::ColumnStore;
/// fn takes_store(_store: &dyn ColumnStore) {}
/// ```
pub trait ColumnStore: Send + Sync {
    /// Read one column
    ///
    /// Returns None if the column doesn't exist or is expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn read_column(
        &self,
        row: &RowKey,
        column: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>>;

    /// Write one column, applied immediately
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn write_column(
        &self,
        row: &RowKey,
        column: Vec<u8>,
        value: Vec<u8>,
        ttl: Option<Duration>,
        level: ConsistencyLevel,
    ) -> Result<()>;

    /// Delete one column, applied immediately
    ///
    /// Deleting a missing column is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete_column(&self, row: &RowKey, column: &[u8], level: ConsistencyLevel) -> Result<()>;

    /// Delete every column between two inclusive boundaries
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn delete_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        level: ConsistencyLevel,
    ) -> Result<()>;

    /// Scan columns between two inclusive boundaries
    ///
    /// Results are ascending by column name, or descending when `reverse`
    /// is set. At most `limit` columns are returned (None = all).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn scan_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        reverse: bool,
        limit: Option<usize>,
        level: ConsistencyLevel,
    ) -> Result<Vec<Column>>;

    /// Apply a batch of mutations atomically
    ///
    /// Either every mutation is applied or none is. Callers must not assume
    /// partial success after an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is rejected.
    fn commit_batch(&self, mutations: Vec<Mutation>, level: ConsistencyLevel) -> Result<()>;
}
