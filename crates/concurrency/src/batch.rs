//! Batch mutation context
//!
//! A `BatchContext` is the unit of work for wide map and entity writes. In
//! batched mode it buffers every write and delete and hands them to the
//! storage collaborator in one `commit_batch` call on `flush()`. In
//! immediate mode every operation is applied on the spot.
//!
//! # Lifecycle
//!
//! Created at the start of a unit of work, populated by zero or more
//! operations, flushed once, then gone: `flush` takes `self`.
//!
//! # Visibility
//!
//! Staged operations are not visible to reads until `flush()` succeeds.
//! Reads always go straight to the store.
//!
//! # Threading
//!
//! A context belongs to one unit of work on one thread. It is `Send` so it
//! can move with its task, and takes `&mut self` for every mutation, so it
//! cannot be shared across concurrent operations without the caller adding
//! its own synchronization.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use widecol_core::error::{Error, Result};
use widecol_core::{ColumnStore, ConsistencyLevel, ConsistencyPolicy, Mutation, RowKey};

/// How operations issued through a context are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Buffer until `flush()`
    Batched,
    /// Apply each operation immediately
    Immediate,
}

/// Summary of staged operations
///
/// Useful for debugging, logging, or checking what a flush would commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingOperations {
    /// Number of staged column writes
    pub puts: usize,
    /// Number of staged single-column deletes
    pub deletes: usize,
    /// Number of staged range deletes
    pub range_deletes: usize,
}

impl PendingOperations {
    /// Total number of staged operations
    pub fn total(&self) -> usize {
        self.puts + self.deletes + self.range_deletes
    }

    /// Check if there are no staged operations
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Accumulator of column mutations for one unit of work
pub struct BatchContext {
    store: Arc<dyn ColumnStore>,
    policy: ConsistencyPolicy,
    mode: BatchMode,
    staged: Vec<Mutation>,
    commit_level: ConsistencyLevel,
    max_batch_size: Option<usize>,
}

impl BatchContext {
    /// Create a context that buffers until `flush()`
    ///
    /// The batch commits at the policy's default write level.
    pub fn batched(store: Arc<dyn ColumnStore>, policy: ConsistencyPolicy) -> Self {
        Self::new(store, policy, BatchMode::Batched)
    }

    /// Create a context that applies every operation immediately
    pub fn immediate(store: Arc<dyn ColumnStore>, policy: ConsistencyPolicy) -> Self {
        Self::new(store, policy, BatchMode::Immediate)
    }

    fn new(store: Arc<dyn ColumnStore>, policy: ConsistencyPolicy, mode: BatchMode) -> Self {
        let commit_level = policy.default_write();
        BatchContext {
            store,
            policy,
            mode,
            staged: Vec::new(),
            commit_level,
            max_batch_size: None,
        }
    }

    /// Reject flushes of more than `max` staged operations
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }

    /// Commit at `level` instead of the policy's default write level
    pub fn with_commit_level(mut self, level: ConsistencyLevel) -> Self {
        self.commit_level = level;
        self
    }

    /// True when operations are buffered until `flush()`
    pub fn is_batched(&self) -> bool {
        self.mode == BatchMode::Batched
    }

    /// Mode of this context
    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    /// Level the batch will be committed at
    pub fn commit_level(&self) -> ConsistencyLevel {
        self.commit_level
    }

    /// Stage (or apply) one column write
    ///
    /// # Errors
    ///
    /// In immediate mode, returns the store's error.
    pub fn stage(
        &mut self,
        row: RowKey,
        column: Vec<u8>,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<()> {
        match self.mode {
            BatchMode::Batched => {
                self.staged.push(Mutation::Put {
                    row,
                    column,
                    value,
                    ttl,
                });
                Ok(())
            }
            BatchMode::Immediate => {
                let level = self.policy.write_level(&row.table);
                self.store.write_column(&row, column, value, ttl, level)
            }
        }
    }

    /// Stage (or apply) one column delete
    ///
    /// # Errors
    ///
    /// In immediate mode, returns the store's error.
    pub fn stage_delete(&mut self, row: RowKey, column: Vec<u8>) -> Result<()> {
        match self.mode {
            BatchMode::Batched => {
                self.staged.push(Mutation::Delete { row, column });
                Ok(())
            }
            BatchMode::Immediate => {
                let level = self.policy.write_level(&row.table);
                self.store.delete_column(&row, &column, level)
            }
        }
    }

    /// Stage (or apply) a delete of every column between two inclusive
    /// boundaries (empty = open)
    ///
    /// # Errors
    ///
    /// In immediate mode, returns the store's error.
    pub fn stage_delete_range(&mut self, row: RowKey, low: Vec<u8>, high: Vec<u8>) -> Result<()> {
        match self.mode {
            BatchMode::Batched => {
                self.staged.push(Mutation::DeleteRange { row, low, high });
                Ok(())
            }
            BatchMode::Immediate => {
                let level = self.policy.write_level(&row.table);
                self.store.delete_range(&row, &low, &high, level)
            }
        }
    }

    /// Summary of what is currently staged
    pub fn pending(&self) -> PendingOperations {
        let mut pending = PendingOperations::default();
        for m in &self.staged {
            match m {
                Mutation::Put { .. } => pending.puts += 1,
                Mutation::Delete { .. } => pending.deletes += 1,
                Mutation::DeleteRange { .. } => pending.range_deletes += 1,
            }
        }
        pending
    }

    /// Staged mutations, in staging order
    pub fn staged(&self) -> &[Mutation] {
        &self.staged
    }

    /// Commit every staged operation as one atomic storage batch
    ///
    /// Returns what was committed. In immediate mode, or with nothing
    /// staged, no storage call is made.
    ///
    /// # Errors
    ///
    /// `BatchCommit` if the batch exceeds the size limit or the store
    /// rejects it. Nothing staged is retried; whether any part of a
    /// rejected batch was applied is up to the store, and callers must not
    /// assume partial success.
    pub fn flush(mut self) -> Result<PendingOperations> {
        let pending = self.pending();
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return Ok(pending);
        }

        if let Some(max) = self.max_batch_size {
            if staged.len() > max {
                warn!(
                    target: "widecol::batch",
                    staged = staged.len(),
                    max,
                    "Batch exceeds size limit, discarding"
                );
                return Err(Error::batch_commit(format!(
                    "{} staged operations exceed max_batch_size {}",
                    staged.len(),
                    max
                )));
            }
        }

        let count = staged.len();
        match self.store.commit_batch(staged, self.commit_level) {
            Ok(()) => {
                debug!(
                    target: "widecol::batch",
                    puts = pending.puts,
                    deletes = pending.deletes,
                    range_deletes = pending.range_deletes,
                    level = %self.commit_level,
                    "Flushed batch"
                );
                Ok(pending)
            }
            Err(e) => {
                warn!(target: "widecol::batch", staged = count, error = %e, "Batch rejected");
                Err(Error::batch_commit(e.to_string()))
            }
        }
    }

    /// Drop every staged operation without committing
    ///
    /// Returns what was discarded.
    pub fn discard(mut self) -> PendingOperations {
        let pending = self.pending();
        self.staged.clear();
        pending
    }
}

impl Drop for BatchContext {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            warn!(
                target: "widecol::batch",
                staged = self.staged.len(),
                "Batch context dropped with unflushed operations"
            );
        }
    }
}

impl std::fmt::Debug for BatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchContext")
            .field("mode", &self.mode)
            .field("staged", &self.staged.len())
            .field("commit_level", &self.commit_level)
            .field("max_batch_size", &self.max_batch_size)
            .finish()
    }
}
