//! Column-backed entity repository
//!
//! One entity is one row of its table, keyed by the bincode encoding of its
//! primary key. Each top-level field is one column holding the field's JSON
//! encoding. A marker column makes existence a single column read.
//!
//! Field columns and the marker lead with a `Bool` component; wide maps
//! stored in the same row lead with a `Text` component, so the two never
//! interleave.

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;
use widecol_concurrency::BatchContext;
use widecol_core::{
    ColumnStore, Component, ComponentType, CompositeKey, CompositeSchema, ConsistencyPolicy, Error,
    Result, RowKey,
};

use super::{Entity, EntityPersister};
use crate::context::with_batch;

/// Field name → JSON value, as stored
pub type FieldMap = BTreeMap<String, JsonValue>;

/// Persists entities of type `E` into a `ColumnStore`
pub struct EntityRepository<E: Entity> {
    store: Arc<dyn ColumnStore>,
    policy: ConsistencyPolicy,
    fields: CompositeSchema,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
            fields: self.fields.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    /// Create a repository over `store`
    pub fn new(store: Arc<dyn ColumnStore>, policy: ConsistencyPolicy) -> Self {
        Self {
            store,
            policy,
            fields: CompositeSchema::with_prefix(
                vec![Component::Bool(false)],
                vec![ComponentType::Text],
            ),
            _entity: PhantomData,
        }
    }

    /// Row holding the entity with primary key `id`
    pub fn row_for(id: &E::Id) -> Result<RowKey> {
        RowKey::for_id(E::TABLE, id)
    }

    fn marker_column() -> Vec<u8> {
        CompositeKey::exact(vec![Component::Bool(true)]).encode()
    }

    fn field_column(&self, name: &str) -> Result<Vec<u8>> {
        self.fields.encode_exact(&[Component::Text(name.to_string())])
    }

    /// Split an entity into its top-level fields
    pub fn to_fields(entity: &E) -> Result<FieldMap> {
        match serde_json::to_value(entity)? {
            JsonValue::Object(map) => Ok(map.into_iter().collect()),
            other => Err(Error::Serialization(format!(
                "entity of table '{}' must serialize to a map of fields, got {}",
                E::TABLE,
                other
            ))),
        }
    }

    /// Rebuild an entity from its fields
    pub fn from_fields(fields: FieldMap) -> Result<E> {
        let map: serde_json::Map<String, JsonValue> = fields.into_iter().collect();
        Ok(serde_json::from_value(JsonValue::Object(map))?)
    }

    /// Read the stored fields of an entity
    ///
    /// Returns None when the entity does not exist.
    pub fn load_fields(&self, id: &E::Id) -> Result<Option<FieldMap>> {
        let row = Self::row_for(id)?;
        let level = self.policy.read_level(E::TABLE);
        if self
            .store
            .read_column(&row, &Self::marker_column(), level)?
            .is_none()
        {
            return Ok(None);
        }

        let columns = self.store.scan_range(
            &row,
            &self.fields.open_low(),
            &self.fields.open_high(),
            false,
            None,
            level,
        )?;
        let mut fields = FieldMap::new();
        for column in columns {
            let name = match self.fields.decode(&column.name)?.pop() {
                Some(Component::Text(name)) => name,
                _ => return Err(Error::malformed_key("entity field column without a name")),
            };
            fields.insert(name, serde_json::from_slice(&column.value)?);
        }
        Ok(Some(fields))
    }

    /// Write the given fields of an entity (and its marker column)
    ///
    /// Fields not named are left untouched.
    pub fn write_fields(
        &self,
        id: &E::Id,
        fields: &FieldMap,
        batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        self.update_fields(id, fields, &BTreeSet::new(), batch)
    }

    /// Write `fields` and delete the columns of the fields in `removed`
    ///
    /// Deletes are staged ahead of the writes in the same context.
    pub fn update_fields(
        &self,
        id: &E::Id,
        fields: &FieldMap,
        removed: &BTreeSet<String>,
        batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        let row = Self::row_for(id)?;
        let deletes = removed
            .iter()
            .map(|name| self.field_column(name))
            .collect::<Result<Vec<_>>>()?;
        let columns = self.encode_fields(fields)?;

        with_batch(&self.store, &self.policy, batch, |ctx| {
            for column in deletes {
                ctx.stage_delete(row.clone(), column)?;
            }
            Self::stage_columns(ctx, &row, columns, removed.len())
        })
    }

    /// Replace every field column of an entity with `fields`
    ///
    /// Field columns absent from `fields` are deleted; wide maps stored in
    /// the same row are not touched.
    pub fn replace_fields(
        &self,
        id: &E::Id,
        fields: &FieldMap,
        batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        let row = Self::row_for(id)?;
        let columns = self.encode_fields(fields)?;
        let (low, high) = (self.fields.open_low(), self.fields.open_high());

        with_batch(&self.store, &self.policy, batch, |ctx| {
            ctx.stage_delete_range(row.clone(), low, high)?;
            Self::stage_columns(ctx, &row, columns, 0)
        })
    }

    fn encode_fields(&self, fields: &FieldMap) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut columns = Vec::with_capacity(fields.len() + 1);
        for (name, value) in fields {
            columns.push((self.field_column(name)?, serde_json::to_vec(value)?));
        }
        columns.push((Self::marker_column(), Vec::new()));
        Ok(columns)
    }

    fn stage_columns(
        ctx: &mut BatchContext,
        row: &RowKey,
        columns: Vec<(Vec<u8>, Vec<u8>)>,
        deleted: usize,
    ) -> Result<()> {
        let written = columns.len();
        for (column, value) in columns {
            ctx.stage(row.clone(), column, value, None)?;
        }
        debug!(
            target: "widecol::entity",
            row = %row,
            columns = written,
            deleted,
            batched = ctx.is_batched(),
            "Wrote entity fields"
        );
        Ok(())
    }
}

impl<E: Entity> EntityPersister<E> for EntityRepository<E> {
    fn load_by_id(&self, id: &E::Id) -> Result<Option<E>> {
        match self.load_fields(id)? {
            Some(fields) => Ok(Some(Self::from_fields(fields)?)),
            None => Ok(None),
        }
    }

    fn persist(&self, entity: &E, batch: Option<&mut BatchContext>) -> Result<E::Id> {
        let id = entity.id();
        let fields = Self::to_fields(entity)?;
        self.replace_fields(&id, &fields, batch)?;
        Ok(id)
    }

    fn exists(&self, id: &E::Id) -> Result<bool> {
        let row = Self::row_for(id)?;
        let level = self.policy.read_level(E::TABLE);
        Ok(self
            .store
            .read_column(&row, &Self::marker_column(), level)?
            .is_some())
    }

    fn remove(&self, id: &E::Id, batch: Option<&mut BatchContext>) -> Result<()> {
        let row = Self::row_for(id)?;
        with_batch(&self.store, &self.policy, batch, |ctx| {
            debug!(target: "widecol::entity", row = %row, "Removing entity row");
            ctx.stage_delete_range(row.clone(), Vec::new(), Vec::new())
        })
    }
}
