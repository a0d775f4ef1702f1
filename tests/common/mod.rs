//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use widecol::{
    Column, ColumnStore, ConsistencyLevel, Entity, EntityManager, Error, MemoryColumnStore,
    Mutation, Result, RowKey, WideColConfig,
};

// ============================================================================
// Initialization
// ============================================================================

/// Install a fmt subscriber that writes through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ============================================================================
// RecordingStore - ColumnStore wrapper with call counts and fault injection
// ============================================================================

/// Which collaborator call a consistency level was handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Read,
    Write,
    Delete,
    Scan,
    Commit,
}

/// Wraps a `MemoryColumnStore`, counting calls, recording the consistency
/// level of each, and failing writes that touch a poisoned table.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryColumnStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
    scans: AtomicUsize,
    commits: AtomicUsize,
    levels: Mutex<Vec<(Call, String, ConsistencyLevel)>>,
    failing_tables: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every write, delete and batch touching `table` fail.
    pub fn fail_writes_to(&self, table: &str) {
        self.failing_tables.lock().unwrap().insert(table.to_string());
    }

    pub fn heal(&self) {
        self.failing_tables.lock().unwrap().clear();
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Levels handed to the store, in call order.
    pub fn levels(&self) -> Vec<(Call, String, ConsistencyLevel)> {
        self.levels.lock().unwrap().clone()
    }

    pub fn clear_levels(&self) {
        self.levels.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &MemoryColumnStore {
        &self.inner
    }

    fn record(&self, call: Call, row: &RowKey, level: ConsistencyLevel) {
        self.levels
            .lock()
            .unwrap()
            .push((call, row.table.clone(), level));
    }

    fn check(&self, row: &RowKey) -> Result<()> {
        if self.failing_tables.lock().unwrap().contains(&row.table) {
            return Err(Error::storage(format!("injected failure for {}", row.table)));
        }
        Ok(())
    }
}

impl ColumnStore for RecordingStore {
    fn read_column(
        &self,
        row: &RowKey,
        column: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Read, row, level);
        self.inner.read_column(row, column, level)
    }

    fn write_column(
        &self,
        row: &RowKey,
        column: Vec<u8>,
        value: Vec<u8>,
        ttl: Option<Duration>,
        level: ConsistencyLevel,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Write, row, level);
        self.check(row)?;
        self.inner.write_column(row, column, value, ttl, level)
    }

    fn delete_column(&self, row: &RowKey, column: &[u8], level: ConsistencyLevel) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Delete, row, level);
        self.check(row)?;
        self.inner.delete_column(row, column, level)
    }

    fn delete_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        level: ConsistencyLevel,
    ) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Delete, row, level);
        self.check(row)?;
        self.inner.delete_range(row, low, high, level)
    }

    fn scan_range(
        &self,
        row: &RowKey,
        low: &[u8],
        high: &[u8],
        reverse: bool,
        limit: Option<usize>,
        level: ConsistencyLevel,
    ) -> Result<Vec<Column>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.record(Call::Scan, row, level);
        self.inner.scan_range(row, low, high, reverse, limit, level)
    }

    fn commit_batch(&self, mutations: Vec<Mutation>, level: ConsistencyLevel) -> Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        if let Some(first) = mutations.first() {
            self.record(Call::Commit, first.row(), level);
        }
        // All-or-nothing: reject the whole batch before applying any of it
        for m in &mutations {
            self.check(m.row())?;
        }
        self.inner.commit_batch(mutations, level)
    }
}

/// EntityManager over a fresh RecordingStore with default configuration.
pub fn manager() -> (Arc<RecordingStore>, EntityManager) {
    manager_with(WideColConfig::default())
}

pub fn manager_with(config: WideColConfig) -> (Arc<RecordingStore>, EntityManager) {
    init_tracing();
    let store = RecordingStore::new();
    let em = EntityManager::new(store.clone(), config).unwrap();
    (store, em)
}

// ============================================================================
// Test entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl Entity for User {
    const TABLE: &'static str = "users";
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

pub fn user(id: u64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: Uuid,
    pub author: u64,
    pub content: String,
}

impl Entity for Tweet {
    const TABLE: &'static str = "tweets";
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn tweet(author: u64, content: &str) -> Tweet {
    Tweet {
        id: Uuid::new_v4(),
        author,
        content: content.to_string(),
    }
}
