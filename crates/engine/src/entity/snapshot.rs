//! Entity snapshot with explicit dirty tracking
//!
//! A snapshot owns a loaded entity together with the field values it was
//! loaded (or last flushed) with. Changes go through `modify`, which
//! recomputes the set of top-level fields that differ from the stored
//! state, including stored fields that are no longer serialized; `flush`
//! writes or deletes only those fields.

use std::collections::BTreeSet;

use tracing::debug;
use widecol_concurrency::BatchContext;
use widecol_core::{Error, Result};

use super::repository::{EntityRepository, FieldMap};
use super::{render_id, Entity, EntityPersister};

/// A loaded entity plus the set of fields changed since load or flush
pub struct EntitySnapshot<E: Entity> {
    repository: EntityRepository<E>,
    id: E::Id,
    entity: E,
    stored: FieldMap,
    dirty: BTreeSet<String>,
}

impl<E: Entity> EntitySnapshot<E> {
    /// Load the entity with primary key `id`
    ///
    /// Returns None when it does not exist.
    pub fn load(repository: EntityRepository<E>, id: &E::Id) -> Result<Option<Self>> {
        let Some(stored) = repository.load_fields(id)? else {
            return Ok(None);
        };
        let entity = EntityRepository::<E>::from_fields(stored.clone())?;
        Ok(Some(Self {
            repository,
            id: id.clone(),
            entity,
            stored,
            dirty: BTreeSet::new(),
        }))
    }

    /// The entity as currently modified
    pub fn get(&self) -> &E {
        &self.entity
    }

    /// Primary key
    pub fn id(&self) -> &E::Id {
        &self.id
    }

    /// Apply `f` to the entity and recompute the dirty set
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `f` changes the primary key.
    pub fn modify(&mut self, f: impl FnOnce(&mut E)) -> Result<()> {
        let mut next = self.entity.clone();
        f(&mut next);
        if next.id() != self.id {
            return Err(Error::invalid_input(format!(
                "primary key of {}/{} cannot be modified",
                E::TABLE,
                render_id(&self.id)
            )));
        }
        let fields = EntityRepository::<E>::to_fields(&next)?;
        let changed = fields
            .iter()
            .filter(|(name, value)| self.stored.get(*name) != Some(*value))
            .map(|(name, _)| name.clone());
        // Stored fields the entity no longer serializes
        let dropped = self
            .stored
            .keys()
            .filter(|name| !fields.contains_key(*name))
            .cloned();
        self.dirty = changed.chain(dropped).collect();
        self.entity = next;
        Ok(())
    }

    /// Fields changed since load or the last flush
    pub fn dirty_fields(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    /// True when there is something to flush
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Write dirty fields and clear the dirty set
    ///
    /// Fields the entity stopped serializing are deleted. Returns the
    /// number of fields written or deleted. With a batch the writes are
    /// staged and the snapshot treats them as stored.
    pub fn flush(&mut self, batch: Option<&mut BatchContext>) -> Result<usize> {
        if self.dirty.is_empty() {
            return Ok(0);
        }
        let all = EntityRepository::<E>::to_fields(&self.entity)?;
        let removed: BTreeSet<String> = self
            .dirty
            .iter()
            .filter(|name| !all.contains_key(*name))
            .cloned()
            .collect();
        let changed: FieldMap = all
            .into_iter()
            .filter(|(name, _)| self.dirty.contains(name))
            .collect();
        self.repository
            .update_fields(&self.id, &changed, &removed, batch)?;

        let written = self.dirty.len();
        debug!(
            target: "widecol::entity",
            table = E::TABLE,
            id = %render_id(&self.id),
            fields = written,
            "Flushed dirty fields"
        );
        self.stored.extend(changed);
        self.stored.retain(|name, _| !removed.contains(name));
        self.dirty.clear();
        Ok(written)
    }

    /// Reload from storage, discarding unflushed changes
    ///
    /// # Errors
    ///
    /// `StaleEntity` if the entity no longer exists.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(stored) = self.repository.load_fields(&self.id)? else {
            return Err(Error::StaleEntity {
                table: E::TABLE.to_string(),
                id: render_id(&self.id),
            });
        };
        self.entity = EntityRepository::<E>::from_fields(stored.clone())?;
        self.stored = stored;
        self.dirty.clear();
        Ok(())
    }

    /// Remove the entity and consume the snapshot
    pub fn remove(self, batch: Option<&mut BatchContext>) -> Result<()> {
        self.repository.remove(&self.id, batch)
    }

    /// Consume the snapshot, returning the entity
    pub fn into_inner(self) -> E {
        self.entity
    }
}
