//! widecol - typed entity graphs over a wide-column store
//!
//! widecol maps entities onto rows of a sorted wide-column store and
//! provides ordered "wide map" columns addressed by composite keys: ranged
//! reads in either direction, lazy paged iteration, and join columns that
//! cascade persistence of referenced entities into one atomic batch.
//!
//! # Quick Start
//!
//! ```ignore
//! use widecol::{EntityManager, JoinProperties, WideMapLocation};
//!
//! let em = EntityManager::in_memory()?;
//! let timeline = em.wide_map::<i64, String>(WideMapLocation::external("timeline", "alice")?);
//!
//! timeline.insert(&1, &"hello".to_string())?;
//! let recent = timeline.find(None, true, None, true, true, 10)?;
//! ```
//!
//! # Architecture
//!
//! - `widecol-core`: composite key codec, range boundaries, errors, the
//!   `ColumnStore` trait
//! - `widecol-storage`: in-memory `ColumnStore`
//! - `widecol-concurrency`: batch mutation context
//! - `widecol-engine`: entities, join columns, wide maps, `EntityManager`

pub use widecol_concurrency::{BatchContext, BatchMode, PendingOperations};
pub use widecol_core::{
    Column, ColumnStore, Component, ComponentType, ConsistencyLevel, ConsistencyPolicy, Error,
    Mutation, Result, RowKey, WideMapKey,
};
pub use widecol_engine::*;
pub use widecol_storage::{MemoryColumnStore, StoreStats};
