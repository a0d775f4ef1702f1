//! Storage layer for widecol
//!
//! This crate implements the in-memory wide-column backend:
//! - MemoryColumnStore: sorted rows of sorted columns behind an RwLock
//! - StoredColumn: column value with write time and TTL
//! - StoreStats: call counters for inspection and tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod stored;

pub use memory::{MemoryColumnStore, StoreStats};
pub use stored::StoredColumn;
