//! Batched view of a wide map
//!
//! Every mutator stages into the borrowed `BatchContext` instead of writing
//! immediately. Join values cascade into the same context. Reads go through
//! the map and do not see staged writes.

use widecol_concurrency::BatchContext;
use widecol_core::{Result, WideMapKey};

use super::{ttl_from_secs, WideMap};

/// A wide map bound to a batch context
pub struct Batched<'a, K, V> {
    map: &'a WideMap<K, V>,
    ctx: &'a mut BatchContext,
}

impl<'a, K: WideMapKey, V: 'static> Batched<'a, K, V> {
    pub(crate) fn new(map: &'a WideMap<K, V>, ctx: &'a mut BatchContext) -> Self {
        Self { map, ctx }
    }

    /// The underlying map
    pub fn map(&self) -> &WideMap<K, V> {
        self.map
    }

    /// The batch operations are staged into
    pub fn context(&mut self) -> &mut BatchContext {
        &mut *self.ctx
    }

    /// Stage `value` under `key`
    pub fn insert(&mut self, key: &K, value: &V) -> Result<()> {
        self.map.put(key, Some(value), None, Some(&mut *self.ctx))
    }

    /// Stage `value` under `key`, expiring after `ttl` seconds
    ///
    /// # Errors
    ///
    /// `InvalidTtl` if `ttl <= 0`; nothing is staged.
    pub fn insert_with_ttl(&mut self, key: &K, value: &V, ttl: i64) -> Result<()> {
        let ttl = ttl_from_secs(ttl)?;
        self.map.put(key, Some(value), Some(ttl), Some(&mut *self.ctx))
    }

    /// Stage a possibly missing value
    pub fn insert_option(&mut self, key: &K, value: Option<&V>) -> Result<()> {
        self.map.put(key, value, None, Some(&mut *self.ctx))
    }

    /// Stage the delete of `key`
    pub fn remove(&mut self, key: &K) -> Result<()> {
        self.map.delete(key, Some(&mut *self.ctx))
    }

    /// Stage the delete of every entry between `start` and `end`
    pub fn remove_range(
        &mut self,
        start: Option<&K>,
        inclusive_start: bool,
        end: Option<&K>,
        inclusive_end: bool,
    ) -> Result<()> {
        self.map
            .delete_range(start, inclusive_start, end, inclusive_end, Some(&mut *self.ctx))
    }

    /// Stage the delete of the `count` smallest entries
    ///
    /// The entries are chosen by a scan issued now.
    pub fn remove_first(&mut self, count: usize) -> Result<()> {
        self.map.delete_edge(count, false, Some(&mut *self.ctx))
    }

    /// Stage the delete of the `count` largest entries
    pub fn remove_last(&mut self, count: usize) -> Result<()> {
        self.map.delete_edge(count, true, Some(&mut *self.ctx))
    }
}
