//! Entities and the entity loader/persister collaborator
//!
//! An entity is any serde-serializable struct with a table name and an
//! identifier. `EntityPersister` is the seam join columns go through;
//! `EntityRepository` is the column-backed implementation.

pub mod repository;
pub mod snapshot;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use widecol_concurrency::BatchContext;
use widecol_core::Result;

pub use repository::EntityRepository;
pub use snapshot::EntitySnapshot;

/// A persistable entity
///
/// The entity must serialize to a map of named fields; each top-level
/// field becomes one column of the entity's row.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Logical table the entity's rows live in
    const TABLE: &'static str;

    /// Primary key type
    type Id: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync + 'static;

    /// Primary key of this entity
    fn id(&self) -> Self::Id;
}

/// Loads, persists and checks the existence of entities of one type
///
/// Writes go into `batch` when one is supplied, so they commit together
/// with whatever else the caller staged; otherwise they apply immediately.
pub trait EntityPersister<E: Entity>: Send + Sync {
    /// Load an entity by primary key
    fn load_by_id(&self, id: &E::Id) -> Result<Option<E>>;

    /// Write every field of `entity`, returning its primary key
    fn persist(&self, entity: &E, batch: Option<&mut BatchContext>) -> Result<E::Id>;

    /// Check that an entity exists
    fn exists(&self, id: &E::Id) -> Result<bool>;

    /// Remove an entity's row
    fn remove(&self, id: &E::Id, batch: Option<&mut BatchContext>) -> Result<()>;
}

/// Debug rendering of an identifier for error messages
pub(crate) fn render_id<I: Debug>(id: &I) -> String {
    format!("{:?}", id)
}
