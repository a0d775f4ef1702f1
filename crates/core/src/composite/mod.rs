//! Composite keys: typed multi-component column names
//!
//! - `component`: component values, type markers, equality markers
//! - `codec`: order-preserving binary encoding
//! - `schema`: per-map component types and constant prefix
//! - `bounds`: logical range → binary scan boundaries
//! - `key`: Rust sub-key types ↔ components
//!
//! The one invariant everything here protects: for two keys over the same
//! schema, unsigned lexicographic comparison of their encodings equals the
//! tuple-wise comparison of their components.

pub mod bounds;
pub mod codec;
pub mod component;
pub mod key;
pub mod schema;

pub use bounds::{build_bounds, BoundPair, ScanBounds};
pub use codec::{decode_components, encode_components, CompositeKey};
pub use component::{Component, ComponentEquality, ComponentType};
pub use key::{KeyComponent, WideMapKey};
pub use schema::CompositeSchema;
