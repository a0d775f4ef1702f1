//! Concurrency layer for widecol
//!
//! This crate implements the batch mutation context:
//! - BatchContext: staged writes committed as one atomic storage batch
//! - BatchMode: batched or immediate application
//! - PendingOperations: summary of what is staged
//!
//! There is no client-side locking. Concurrent writers to one row resolve
//! last-write-wins in the store; atomicity stops at one batch.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;

pub use batch::{BatchContext, BatchMode, PendingOperations};
