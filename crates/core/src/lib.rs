//! Core types and traits for widecol
//!
//! This crate defines the foundational types used throughout the system:
//! - RowKey / Column: row identity and raw columns
//! - Composite keys: order-preserving codec, schemas, range boundaries
//! - WideMapKey: typed sub-keys for wide maps
//! - ConsistencyLevel / ConsistencyPolicy: per-operation consistency tokens
//! - Mutation: staged column writes and deletes
//! - Error: Error type hierarchy
//! - Traits: the storage collaborator (ColumnStore)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composite;
pub mod consistency;
pub mod error;
pub mod mutation;
pub mod traits;
pub mod types;

pub use composite::{
    build_bounds, decode_components, encode_components, BoundPair, Component, ComponentEquality,
    ComponentType, CompositeKey, CompositeSchema, KeyComponent, ScanBounds, WideMapKey,
};
pub use consistency::{ConsistencyLevel, ConsistencyPolicy};
pub use error::{Error, Result};
pub use mutation::Mutation;
pub use traits::ColumnStore;
pub use types::{Column, RowKey};
