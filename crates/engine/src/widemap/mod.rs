//! Wide map access layer
//!
//! A wide map is an ordered collection of (sub-key, value) pairs stored as
//! the columns of one row. Sub-keys are composite keys, so range reads are
//! single contiguous scans.
//!
//! ## Location
//!
//! - External maps own a row of their own table.
//! - Internal maps live inside their owning entity's row, under the
//!   property name as a constant leading key component.
//!
//! ## Writes
//!
//! Mutators on `WideMap` apply immediately. The same mutators on the view
//! returned by `batched(&mut ctx)` stage into the caller's context; for join
//! values, cascaded entity writes are staged into that same context so the
//! parent column and the child entity commit together.
//!
//! ## Value resolution
//!
//! Join values are resolved through the entity loader when an entry is
//! decoded. `find_keys` never resolves values.

pub mod batched;
pub mod iterator;
pub mod mapper;

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use widecol_concurrency::BatchContext;
use widecol_core::{
    build_bounds, Column, ColumnStore, Component, ComponentType, CompositeSchema,
    ConsistencyLevel, ConsistencyPolicy, Error, Result, RowKey, ScanBounds, WideMapKey,
};

use crate::context::with_batch;
use crate::entity::{Entity, EntityRepository};

pub use batched::Batched;
pub use iterator::WideMapIterator;
pub use mapper::{JoinMapper, ScalarMapper, ValueMapper};

/// Where a wide map's columns live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WideMapLocation {
    /// A row of the map's own table
    External {
        /// Table holding the map
        table: String,
        /// Binary row identifier
        row: Vec<u8>,
    },
    /// Inside the owning entity's row
    Internal {
        /// The owning entity's row
        owner: RowKey,
        /// Property name, used as the constant key prefix
        property: String,
    },
}

impl WideMapLocation {
    /// External map in `table`, row keyed by the bincode encoding of `id`
    pub fn external<I: Serialize + ?Sized>(table: impl Into<String>, id: &I) -> Result<Self> {
        let row = RowKey::for_id(table, id)?;
        Ok(WideMapLocation::External {
            table: row.table,
            row: row.row,
        })
    }

    /// Internal map stored as `property` of the entity with key `id`
    pub fn internal<E: Entity>(id: &E::Id, property: impl Into<String>) -> Result<Self> {
        let property = property.into();
        if property.is_empty() {
            return Err(Error::invalid_config(
                "internal wide map property name must not be empty",
            ));
        }
        Ok(WideMapLocation::Internal {
            owner: EntityRepository::<E>::row_for(id)?,
            property,
        })
    }

    /// Row the map's columns live in
    pub fn row_key(&self) -> RowKey {
        match self {
            WideMapLocation::External { table, row } => RowKey::new(table.clone(), row.clone()),
            WideMapLocation::Internal { owner, .. } => owner.clone(),
        }
    }

    fn schema(&self, types: Vec<ComponentType>) -> CompositeSchema {
        match self {
            WideMapLocation::External { .. } => CompositeSchema::new(types),
            WideMapLocation::Internal { property, .. } => {
                CompositeSchema::with_prefix(vec![Component::Text(property.clone())], types)
            }
        }
    }
}

/// Convert a TTL in seconds, rejecting zero and negative values
pub(crate) fn ttl_from_secs(ttl: i64) -> Result<Duration> {
    if ttl <= 0 {
        return Err(Error::InvalidTtl { ttl });
    }
    Ok(Duration::from_secs(ttl.unsigned_abs()))
}

/// Keyed, ordered collection of values stored in one row
pub struct WideMap<K, V> {
    store: Arc<dyn ColumnStore>,
    row: RowKey,
    schema: CompositeSchema,
    mapper: Arc<dyn ValueMapper<V>>,
    policy: ConsistencyPolicy,
    page_size: usize,
    _key: PhantomData<fn() -> K>,
}

impl<K, V> Clone for WideMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            row: self.row.clone(),
            schema: self.schema.clone(),
            mapper: Arc::clone(&self.mapper),
            policy: self.policy.clone(),
            page_size: self.page_size,
            _key: PhantomData,
        }
    }
}

impl<K: WideMapKey, V: 'static> WideMap<K, V> {
    /// Create a wide map
    pub fn new(
        store: Arc<dyn ColumnStore>,
        location: WideMapLocation,
        mapper: Arc<dyn ValueMapper<V>>,
        policy: ConsistencyPolicy,
    ) -> Self {
        Self {
            store,
            row: location.row_key(),
            schema: location.schema(K::component_types()),
            mapper,
            policy,
            page_size: 100,
            _key: PhantomData,
        }
    }

    /// Set the iterator page size (at least 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Row holding the map
    pub fn row(&self) -> &RowKey {
        &self.row
    }

    /// Column name schema
    pub fn schema(&self) -> &CompositeSchema {
        &self.schema
    }

    /// Iterator page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn read_level(&self) -> ConsistencyLevel {
        self.policy.read_level(&self.row.table)
    }

    // ========== Reads ==========

    /// Get the value stored under `key`
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let column = self.schema.encode_exact(&key.to_components())?;
        match self.store.read_column(&self.row, &column, self.read_level())? {
            Some(bytes) => Ok(Some(self.mapper.from_column(&bytes)?)),
            None => Ok(None),
        }
    }

    /// True if a value is stored under `key`
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        let column = self.schema.encode_exact(&key.to_components())?;
        Ok(self
            .store
            .read_column(&self.row, &column, self.read_level())?
            .is_some())
    }

    /// Entry with the smallest sub-key
    pub fn first(&self) -> Result<Option<(K, V)>> {
        Ok(self.find(None, true, None, true, false, 1)?.into_iter().next())
    }

    /// Entry with the largest sub-key
    pub fn last(&self) -> Result<Option<(K, V)>> {
        Ok(self.find(None, true, None, true, true, 1)?.into_iter().next())
    }

    /// Entries between `start` and `end`
    ///
    /// `start` and `end` are the logical low and high of the range; `None`
    /// leaves that side open. Results are ascending by sub-key, descending
    /// with `reverse`. `count == 0` means no limit.
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if `start > end` on a forward request
    /// - `MalformedKey` if a stored column name does not decode
    pub fn find(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
        count: usize,
    ) -> Result<Vec<(K, V)>> {
        self.scan(start, inclusive_start, end, inclusive_end, reverse, count)?
            .into_iter()
            .map(|c| self.decode_entry(c))
            .collect()
    }

    /// Sub-keys of `find`, without resolving values
    pub fn find_keys(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
        count: usize,
    ) -> Result<Vec<K>> {
        self.scan(start, inclusive_start, end, inclusive_end, reverse, count)?
            .iter()
            .map(|c| self.decode_key(&c.name))
            .collect()
    }

    /// Values of `find`
    pub fn find_values(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
        count: usize,
    ) -> Result<Vec<V>> {
        self.scan(start, inclusive_start, end, inclusive_end, reverse, count)?
            .into_iter()
            .map(|c| self.decode_entry(c).map(|(_, v)| v))
            .collect()
    }

    /// Lazy, paged version of `find`
    ///
    /// Bounds are validated now; no scan is issued until the first call to
    /// `next()`.
    pub fn iterator(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
        count: usize,
    ) -> Result<WideMapIterator<K, V>> {
        let bounds = self.bounds(start, inclusive_start, end, inclusive_end, reverse)?;
        Ok(WideMapIterator::new(self.clone(), bounds, limit_of(count)))
    }

    // ========== Immediate writes ==========

    /// Store `value` under `key`
    pub fn insert(&self, key: &K, value: &V) -> Result<()> {
        self.put(key, Some(value), None, None)
    }

    /// Store `value` under `key`, expiring after `ttl` seconds
    ///
    /// # Errors
    ///
    /// `InvalidTtl` if `ttl <= 0`; nothing is written.
    pub fn insert_with_ttl(&self, key: &K, value: &V, ttl: i64) -> Result<()> {
        let ttl = ttl_from_secs(ttl)?;
        self.put(key, Some(value), Some(ttl), None)
    }

    /// Store a possibly missing value
    ///
    /// # Errors
    ///
    /// `NullJoinValue` on a join map, `InvalidInput` otherwise, when
    /// `value` is None.
    pub fn insert_option(&self, key: &K, value: Option<&V>) -> Result<()> {
        self.put(key, value, None, None)
    }

    /// Delete the entry under `key`
    pub fn remove(&self, key: &K) -> Result<()> {
        self.delete(key, None)
    }

    /// Delete every entry between `start` and `end`
    ///
    /// Always forward: `start > end` is `InvalidRange`.
    pub fn remove_range(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
    ) -> Result<()> {
        self.delete_range(start, inclusive_start, end, inclusive_end, None)
    }

    /// Delete the `count` entries with the smallest sub-keys
    pub fn remove_first(&self, count: usize) -> Result<()> {
        self.delete_edge(count, false, None)
    }

    /// Delete the `count` entries with the largest sub-keys
    pub fn remove_last(&self, count: usize) -> Result<()> {
        self.delete_edge(count, true, None)
    }

    /// View whose mutators stage into `ctx`
    pub fn batched<'a>(&'a self, ctx: &'a mut BatchContext) -> Batched<'a, K, V> {
        Batched::new(self, ctx)
    }

    // ========== Internals ==========

    fn bounds(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
    ) -> Result<ScanBounds> {
        let start = start.map(|k| k.to_components());
        let end = end.map(|k| k.to_components());
        build_bounds(
            &self.schema,
            start.as_deref(),
            inclusive_start,
            end.as_deref(),
            inclusive_end,
            reverse,
        )
    }

    fn scan(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        reverse: bool,
        count: usize,
    ) -> Result<Vec<Column>> {
        match self.bounds(start, inclusive_start, end, inclusive_end, reverse)? {
            ScanBounds::Empty => {
                debug!(target: "widecol::widemap", row = %self.row, "Empty range, no scan");
                Ok(Vec::new())
            }
            ScanBounds::Range(p) => {
                self.scan_page(&p.low, &p.high, p.reverse, limit_of(count))
            }
        }
    }

    pub(crate) fn scan_page(
        &self,
        low: &[u8],
        high: &[u8],
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Column>> {
        let columns =
            self.store
                .scan_range(&self.row, low, high, reverse, limit, self.read_level())?;
        debug!(
            target: "widecol::widemap",
            row = %self.row,
            reverse,
            limit = ?limit,
            returned = columns.len(),
            "Scanned range"
        );
        Ok(columns)
    }

    pub(crate) fn decode_key(&self, name: &[u8]) -> Result<K> {
        K::from_components(self.schema.decode(name)?)
    }

    pub(crate) fn decode_entry(&self, column: Column) -> Result<(K, V)> {
        let key = self.decode_key(&column.name)?;
        let value = self.mapper.from_column(&column.value)?;
        Ok((key, value))
    }

    pub(crate) fn put(
        &self,
        key: &K,
        value: Option<&V>,
        ttl: Option<Duration>,
        mut batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        // Join values are persisted or checked before the column is built
        let bytes = self.mapper.to_column(value, batch.as_deref_mut())?;
        let column = self.schema.encode_exact(&key.to_components())?;
        with_batch(&self.store, &self.policy, batch, |ctx| {
            debug!(
                target: "widecol::widemap",
                row = %self.row,
                ttl = ?ttl,
                batched = ctx.is_batched(),
                "Insert"
            );
            ctx.stage(self.row.clone(), column, bytes, ttl)
        })
    }

    pub(crate) fn delete(&self, key: &K, batch: Option<&mut BatchContext>) -> Result<()> {
        let column = self.schema.encode_exact(&key.to_components())?;
        with_batch(&self.store, &self.policy, batch, |ctx| {
            ctx.stage_delete(self.row.clone(), column)
        })
    }

    pub(crate) fn delete_range(
        &self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
        batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        match self.bounds(start, inclusive_start, end, inclusive_end, false)? {
            ScanBounds::Empty => Ok(()),
            ScanBounds::Range(p) => with_batch(&self.store, &self.policy, batch, |ctx| {
                debug!(target: "widecol::widemap", row = %self.row, "Remove range");
                ctx.stage_delete_range(self.row.clone(), p.low, p.high)
            }),
        }
    }

    pub(crate) fn delete_edge(
        &self,
        count: usize,
        from_end: bool,
        batch: Option<&mut BatchContext>,
    ) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let low = self.schema.open_low();
        let high = self.schema.open_high();
        let columns = self.scan_page(&low, &high, from_end, Some(count))?;
        let Some(edge) = columns.last() else {
            return Ok(());
        };
        let (low, high) = if from_end {
            (edge.name.clone(), high)
        } else {
            (low, edge.name.clone())
        };
        let removed = columns.len();
        with_batch(&self.store, &self.policy, batch, |ctx| {
            debug!(
                target: "widecol::widemap",
                row = %self.row,
                removed,
                from_end,
                "Remove edge entries"
            );
            ctx.stage_delete_range(self.row.clone(), low, high)
        })
    }
}

fn limit_of(count: usize) -> Option<usize> {
    if count == 0 {
        None
    } else {
        Some(count)
    }
}
