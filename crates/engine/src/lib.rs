//! Entity and wide map engine for widecol
//!
//! This crate orchestrates the lower layers:
//! - WideColConfig: `widecol.toml` configuration
//! - Entities: the loader/persister seam, the column-backed repository,
//!   dirty-tracking snapshots
//! - Join columns: cascade properties and the cascading join persister
//! - Wide maps: ranged reads, immediate and batched writes, lazy iteration
//! - EntityManager: the facade tying them to one store and policy

#![warn(missing_docs)]
#![warn(clippy::all)]

mod context;

pub mod config;
pub mod entity;
pub mod join;
pub mod manager;
pub mod widemap;

pub use config::{ConsistencyConfig, WideColConfig, CONFIG_FILE_NAME};
pub use entity::{Entity, EntityPersister, EntityRepository, EntitySnapshot};
pub use join::{JoinPersister, JoinProperties, LifecycleOp};
pub use manager::EntityManager;
pub use widemap::{
    Batched, JoinMapper, ScalarMapper, ValueMapper, WideMap, WideMapIterator, WideMapLocation,
};
