//! Wide map integration suite
//!
//! Exercises the full stack (codec, boundaries, batch context, join
//! persister, wide maps, iterator) against a recording store.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test widemap
//! ```

#[path = "../common/mod.rs"]
mod common;

mod batch;
mod consistency;
mod entity;
mod join;
mod keys;
mod ranges;
