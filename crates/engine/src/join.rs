//! Join columns: cascade configuration and the cascading join persister
//!
//! A join column stores the identifier of another entity. Before the
//! identifier is written, the referenced entity is either persisted (when
//! the governing lifecycle operation cascades) or checked for existence.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use widecol_concurrency::BatchContext;
use widecol_core::{Error, Result};

use crate::entity::{render_id, Entity, EntityPersister};

/// Lifecycle operations that can propagate to a referenced entity
///
/// Wide map inserts are governed by `Persist`. Entities carry no join
/// fields of their own, so `Merge` and `Refresh` are only reached through
/// [`JoinPersister::cascade`], called by whoever drives that operation on
/// the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleOp {
    /// First write of the parent (wide map insert)
    Persist,
    /// Update of an already stored parent
    Merge,
    /// Reload of the parent
    Refresh,
    /// Removal of the parent; never allowed on join columns
    Remove,
}

/// Cascade policy of one join column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinProperties {
    cascade: BTreeSet<LifecycleOp>,
}

impl JoinProperties {
    /// Build a cascade policy
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the set contains `Remove`.
    pub fn new(cascade: impl IntoIterator<Item = LifecycleOp>) -> Result<Self> {
        let cascade: BTreeSet<LifecycleOp> = cascade.into_iter().collect();
        if cascade.contains(&LifecycleOp::Remove) {
            return Err(Error::invalid_config(
                "cascade on remove is not supported for join columns",
            ));
        }
        Ok(Self { cascade })
    }

    /// No cascading: referenced entities must already exist
    pub fn none() -> Self {
        Self::default()
    }

    /// Cascade on persist only
    pub fn persist() -> Self {
        Self {
            cascade: [LifecycleOp::Persist].into_iter().collect(),
        }
    }

    /// Cascade on persist, merge and refresh
    pub fn all() -> Self {
        Self {
            cascade: [LifecycleOp::Persist, LifecycleOp::Merge, LifecycleOp::Refresh]
                .into_iter()
                .collect(),
        }
    }

    /// True if `op` propagates to the referenced entity
    pub fn cascades(&self, op: LifecycleOp) -> bool {
        self.cascade.contains(&op)
    }

    /// Operations that propagate
    pub fn cascade_ops(&self) -> impl Iterator<Item = LifecycleOp> + '_ {
        self.cascade.iter().copied()
    }
}

/// Ensures referenced entities exist before their identifier is stored
pub struct JoinPersister<E: Entity> {
    persister: Arc<dyn EntityPersister<E>>,
    properties: JoinProperties,
    property: String,
}

impl<E: Entity> Clone for JoinPersister<E> {
    fn clone(&self) -> Self {
        Self {
            persister: Arc::clone(&self.persister),
            properties: self.properties.clone(),
            property: self.property.clone(),
        }
    }
}

impl<E: Entity> JoinPersister<E> {
    /// Create a persister for the join column `property`
    pub fn new(
        persister: Arc<dyn EntityPersister<E>>,
        properties: JoinProperties,
        property: impl Into<String>,
    ) -> Self {
        Self {
            persister,
            properties,
            property: property.into(),
        }
    }

    /// Cascade policy
    pub fn properties(&self) -> &JoinProperties {
        &self.properties
    }

    /// Persist `value` (cascade on persist) or verify it exists
    ///
    /// Returns the identifier to store in the join column. With a batch,
    /// cascaded writes are staged into it so they commit with the parent.
    ///
    /// # Errors
    ///
    /// - `NullJoinValue` if `value` is None
    /// - `JoinEntityNotFound` if cascade is off and the entity is missing
    pub fn persist_or_ensure_exists(
        &self,
        value: Option<&E>,
        batch: Option<&mut BatchContext>,
    ) -> Result<E::Id> {
        self.cascade(LifecycleOp::Persist, value, batch)
    }

    /// Same as `persist_or_ensure_exists`, governed by `op`
    ///
    /// Entry point for `Merge` and `Refresh`: the referenced entity is
    /// written when `op` cascades, and only checked for existence
    /// otherwise.
    pub fn cascade(
        &self,
        op: LifecycleOp,
        value: Option<&E>,
        batch: Option<&mut BatchContext>,
    ) -> Result<E::Id> {
        let entity = value.ok_or_else(|| Error::NullJoinValue {
            property: self.property.clone(),
        })?;

        if self.properties.cascades(op) {
            debug!(
                target: "widecol::join",
                property = %self.property,
                table = E::TABLE,
                id = %render_id(&entity.id()),
                ?op,
                batched = batch.as_ref().map(|b| b.is_batched()).unwrap_or(false),
                "Cascading join entity"
            );
            return self.persister.persist(entity, batch);
        }

        let id = entity.id();
        if !self.persister.exists(&id)? {
            return Err(Error::JoinEntityNotFound {
                table: E::TABLE.to_string(),
                id: render_id(&id),
            });
        }
        Ok(id)
    }

    /// Resolve a stored identifier into the referenced entity
    ///
    /// # Errors
    ///
    /// `JoinEntityNotFound` if the identifier dangles.
    pub fn load(&self, id: &E::Id) -> Result<E> {
        self.persister
            .load_by_id(id)?
            .ok_or_else(|| Error::JoinEntityNotFound {
                table: E::TABLE.to_string(),
                id: render_id(id),
            })
    }
}
