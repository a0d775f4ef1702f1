//! MemoryColumnStore: in-memory wide-column backend
//!
//! This module implements the ColumnStore trait using:
//! - `BTreeMap<RowKey, BTreeMap<Vec<u8>, StoredColumn>>` for sorted rows of
//!   sorted columns
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` counters for call statistics
//!
//! # Design Notes
//!
//! - **Logical TTL expiration**: Expired columns are filtered at read time;
//!   `purge_expired()` removes them physically
//! - **Batch validation before write lock**: a rejected batch never takes
//!   the lock, so nothing is applied
//! - **Single lock per batch**: every mutation of an accepted batch is
//!   applied under one write lock acquisition
//! - **Consistency levels**: accepted and ignored; there is one replica

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::debug;

use widecol_core::{Column, ColumnStore, ConsistencyLevel, Error, Mutation, Result, RowKey};

use crate::stored::StoredColumn;

type Row = BTreeMap<Vec<u8>, StoredColumn>;

/// Call counters of a `MemoryColumnStore`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `read_column` calls
    pub reads: u64,
    /// `write_column` calls
    pub writes: u64,
    /// `delete_column` and `delete_range` calls
    pub deletes: u64,
    /// `scan_range` calls
    pub scans: u64,
    /// Successful `commit_batch` calls
    pub commits: u64,
}

/// In-memory wide-column storage
///
/// Thread-safe through `parking_lot::RwLock` and `AtomicU64`.
#[derive(Debug, Default)]
pub struct MemoryColumnStore {
    /// Rows by key, each an ordered map of column name to stored column
    data: RwLock<BTreeMap<RowKey, Row>>,
    /// Largest batch accepted by `commit_batch` (None = unlimited)
    max_batch_size: Option<usize>,
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    scans: AtomicU64,
    commits: AtomicU64,
}

impl MemoryColumnStore {
    /// Create a new empty store with no batch size limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects batches larger than `max`
    pub fn with_max_batch_size(max: usize) -> Self {
        Self {
            max_batch_size: Some(max),
            ..Self::default()
        }
    }

    /// Snapshot of the call counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
        }
    }

    /// Number of live (unexpired) columns in a row
    pub fn row_len(&self, row: &RowKey) -> usize {
        let data = self.data.read();
        data.get(row)
            .map(|cols| cols.values().filter(|c| !c.is_expired()).count())
            .unwrap_or(0)
    }

    /// Rows of a table that hold at least one column
    pub fn table_rows(&self, table: &str) -> Vec<RowKey> {
        let data = self.data.read();
        data.keys().filter(|k| k.table == table).cloned().collect()
    }

    /// Physically remove expired columns and empty rows
    ///
    /// Returns the number of columns removed.
    pub fn purge_expired(&self) -> usize {
        let mut data = self.data.write();
        let mut removed = 0;
        for cols in data.values_mut() {
            let before = cols.len();
            cols.retain(|_, c| !c.is_expired());
            removed += before - cols.len();
        }
        data.retain(|_, cols| !cols.is_empty());
        if removed > 0 {
            debug!(target: "widecol::storage", removed, "Purged expired columns");
        }
        removed
    }

    fn range_bounds<'a>(low: &'a [u8], high: &'a [u8]) -> Option<(Bound<&'a [u8]>, Bound<&'a [u8]>)> {
        if !low.is_empty() && !high.is_empty() && low > high {
            return None;
        }
        let lo = if low.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(low)
        };
        let hi = if high.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(high)
        };
        Some((lo, hi))
    }

    fn apply(data: &mut BTreeMap<RowKey, Row>, mutation: Mutation) {
        match mutation {
            Mutation::Put {
                row,
                column,
                value,
                ttl,
            } => {
                data.entry(row)
                    .or_default()
                    .insert(column, StoredColumn::new(value, ttl));
            }
            Mutation::Delete { row, column } => {
                if let Some(cols) = data.get_mut(&row) {
                    cols.remove(&column);
                    if cols.is_empty() {
                        data.remove(&row);
                    }
                }
            }
            Mutation::DeleteRange { row, low, high } => {
                if let Some(cols) = data.get_mut(&row) {
                    if let Some(bounds) = Self::range_bounds(&low, &high) {
                        let doomed: Vec<Vec<u8>> =
                            cols.range::<[u8], _>(bounds).map(|(k, _)| k.clone()).collect();
                        for k in doomed {
                            cols.remove(&k);
                        }
                    }
                    if cols.is_empty() {
                        data.remove(&row);
                    }
                }
            }
        }
    }
}

impl ColumnStore for MemoryColumnStore {
    fn read_column(
        &self,
        row: &RowKey,
        column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read();
        match data.get(row).and_then(|cols| cols.get(column)) {
            Some(c) if !c.is_expired() => Ok(Some(c.value().to_vec())),
            _ => Ok(None),
        }
    }

    fn write_column(
        &self,
        row: &RowKey,
        column: Vec<u8>,
        value: Vec<u8>,
        ttl: Option<Duration>,
        _level: ConsistencyLevel,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut data = self.data.write();
        Self::apply(
            &mut data,
            Mutation::Put {
                row: row.clone(),
                column,
                value,
                ttl,
            },
        );
        Ok(())
    }

    fn delete_column(&self, row: &RowKey, column: &[u8], _level: ConsistencyLevel) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        let mut data = self.data.write();
        Self::apply(
            &mut data,
            Mutation::Delete {
                row: row.clone(),
                column: column.to_vec(),
            },
        );
        Ok(())
    }

    fn delete_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        let mut data = self.data.write();
        Self::apply(
            &mut data,
            Mutation::DeleteRange {
                row: row.clone(),
                low: low.to_vec(),
                high: high.to_vec(),
            },
        );
        Ok(())
    }

    fn scan_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        reverse: bool,
        limit: Option<usize>,
        _level: ConsistencyLevel,
    ) -> Result<Vec<Column>> {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read();
        let (Some(cols), Some(bounds)) = (data.get(row), Self::range_bounds(low, high)) else {
            return Ok(Vec::new());
        };
        let limit = limit.unwrap_or(usize::MAX);
        let live = cols
            .range::<[u8], _>(bounds)
            .filter(|(_, c)| !c.is_expired())
            .map(|(k, c)| Column::new(k.clone(), c.value().to_vec()));
        let result = if reverse {
            live.rev().take(limit).collect()
        } else {
            live.take(limit).collect()
        };
        Ok(result)
    }

    fn commit_batch(&self, mutations: Vec<Mutation>, _level: ConsistencyLevel) -> Result<()> {
        if let Some(max) = self.max_batch_size {
            if mutations.len() > max {
                return Err(Error::storage(format!(
                    "batch of {} mutations exceeds limit of {}",
                    mutations.len(),
                    max
                )));
            }
        }

        let count = mutations.len();
        // One write lock for the whole batch
        let mut data = self.data.write();
        for mutation in mutations {
            Self::apply(&mut data, mutation);
        }
        drop(data);

        self.commits.fetch_add(1, Ordering::Relaxed);
        debug!(target: "widecol::storage", mutations = count, "Committed batch");
        Ok(())
    }
}
