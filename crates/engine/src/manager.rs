//! EntityManager: entry point bundling a store, configuration and policy
//!
//! The manager holds no per-entity state. It hands out repositories, wide
//! maps and batch contexts that all share one `ColumnStore` and one
//! `ConsistencyPolicy`.
//!
//! ## Example
//!
//! ```ignore
//! let em = EntityManager::in_memory()?;
//! let tweets = em.join_wide_map::<i64, Tweet>(
//!     WideMapLocation::external("timeline", &user_id)?,
//!     JoinProperties::persist(),
//! );
//!
//! let mut batch = em.begin_batch();
//! tweets.batched(&mut batch).insert(&ts, &tweet)?;
//! batch.flush()?;
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use widecol_concurrency::BatchContext;
use widecol_core::{ColumnStore, ConsistencyPolicy, Result, WideMapKey};
use widecol_storage::MemoryColumnStore;

use crate::config::{WideColConfig, CONFIG_FILE_NAME};
use crate::entity::{Entity, EntityRepository, EntitySnapshot};
use crate::join::{JoinPersister, JoinProperties};
use crate::widemap::{JoinMapper, ScalarMapper, WideMap, WideMapLocation};

/// Factory for repositories, wide maps and batch contexts
#[derive(Clone)]
pub struct EntityManager {
    store: Arc<dyn ColumnStore>,
    config: WideColConfig,
    policy: ConsistencyPolicy,
}

impl EntityManager {
    /// Create a manager over `store`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` does not validate.
    pub fn new(store: Arc<dyn ColumnStore>, config: WideColConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.consistency_policy()?;
        info!(
            target: "widecol::entity",
            page_size = config.page_size,
            max_batch_size = config.max_batch_size,
            read = %policy.default_read(),
            write = %policy.default_write(),
            "Entity manager ready"
        );
        Ok(Self {
            store,
            config,
            policy,
        })
    }

    /// Manager over a fresh `MemoryColumnStore` with default configuration
    pub fn in_memory() -> Result<Self> {
        Self::new(Arc::new(MemoryColumnStore::new()), WideColConfig::default())
    }

    /// Manager configured from `widecol.toml` in `dir`
    ///
    /// The file is created with defaults on first use.
    pub fn open(store: Arc<dyn ColumnStore>, dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        WideColConfig::write_default_if_missing(&path)?;
        Self::new(store, WideColConfig::from_file(&path)?)
    }

    /// Replace the consistency policy resolved from configuration
    pub fn with_policy(mut self, policy: ConsistencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The shared store
    pub fn store(&self) -> &Arc<dyn ColumnStore> {
        &self.store
    }

    /// Configuration in effect
    pub fn config(&self) -> &WideColConfig {
        &self.config
    }

    /// Consistency policy in effect
    pub fn policy(&self) -> &ConsistencyPolicy {
        &self.policy
    }

    /// Repository for entities of type `E`
    pub fn repository<E: Entity>(&self) -> EntityRepository<E> {
        EntityRepository::new(Arc::clone(&self.store), self.policy.clone())
    }

    /// Load a dirty-tracking snapshot of an entity
    pub fn snapshot<E: Entity>(&self, id: &E::Id) -> Result<Option<EntitySnapshot<E>>> {
        EntitySnapshot::load(self.repository(), id)
    }

    /// Join persister for the join column `property`
    pub fn join_persister<E: Entity>(
        &self,
        property: impl Into<String>,
        properties: JoinProperties,
    ) -> JoinPersister<E> {
        JoinPersister::new(Arc::new(self.repository::<E>()), properties, property)
    }

    /// Wide map of plain values
    pub fn wide_map<K, V>(&self, location: WideMapLocation) -> WideMap<K, V>
    where
        K: WideMapKey,
        V: Serialize + DeserializeOwned + 'static,
    {
        WideMap::new(
            Arc::clone(&self.store),
            location,
            Arc::new(ScalarMapper::<V>::new()),
            self.policy.clone(),
        )
        .with_page_size(self.config.page_size)
    }

    /// Wide map whose values are references to entities of type `E`
    pub fn join_wide_map<K, E>(
        &self,
        location: WideMapLocation,
        properties: JoinProperties,
    ) -> WideMap<K, E>
    where
        K: WideMapKey,
        E: Entity,
    {
        let property = match &location {
            WideMapLocation::External { table, .. } => table.clone(),
            WideMapLocation::Internal { property, .. } => property.clone(),
        };
        let join = self.join_persister::<E>(property, properties);
        WideMap::new(
            Arc::clone(&self.store),
            location,
            Arc::new(JoinMapper::new(join)),
            self.policy.clone(),
        )
        .with_page_size(self.config.page_size)
    }

    /// Start a unit of work whose writes commit on `flush()`
    pub fn begin_batch(&self) -> BatchContext {
        BatchContext::batched(Arc::clone(&self.store), self.policy.clone())
            .with_max_batch_size(self.config.max_batch_size)
    }

    /// Context that applies every operation immediately
    pub fn immediate(&self) -> BatchContext {
        BatchContext::immediate(Arc::clone(&self.store), self.policy.clone())
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish()
    }
}
