//! Conversion between wide map values and column bytes

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use widecol_concurrency::BatchContext;
use widecol_core::{Error, Result};

use crate::entity::Entity;
use crate::join::JoinPersister;

/// Maps wide map values to and from column values
pub trait ValueMapper<V>: Send + Sync {
    /// Encode a value for writing
    ///
    /// Join mappers persist or check the referenced entity here, staging
    /// into `batch` when one is given.
    fn to_column(&self, value: Option<&V>, batch: Option<&mut BatchContext>) -> Result<Vec<u8>>;

    /// Decode a stored column value
    fn from_column(&self, bytes: &[u8]) -> Result<V>;
}

/// Plain values, bincode-encoded
pub struct ScalarMapper<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> ScalarMapper<V> {
    /// Create a scalar mapper
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for ScalarMapper<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize + DeserializeOwned> ValueMapper<V> for ScalarMapper<V> {
    fn to_column(&self, value: Option<&V>, _batch: Option<&mut BatchContext>) -> Result<Vec<u8>> {
        let value = value.ok_or_else(|| Error::invalid_input("wide map values cannot be null"))?;
        Ok(bincode::serialize(value)?)
    }

    fn from_column(&self, bytes: &[u8]) -> Result<V> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Join values: the column holds the referenced entity's identifier
pub struct JoinMapper<E: Entity> {
    join: JoinPersister<E>,
}

impl<E: Entity> JoinMapper<E> {
    /// Create a join mapper
    pub fn new(join: JoinPersister<E>) -> Self {
        Self { join }
    }
}

impl<E: Entity> ValueMapper<E> for JoinMapper<E> {
    fn to_column(&self, value: Option<&E>, batch: Option<&mut BatchContext>) -> Result<Vec<u8>> {
        let id = self.join.persist_or_ensure_exists(value, batch)?;
        Ok(bincode::serialize(&id)?)
    }

    fn from_column(&self, bytes: &[u8]) -> Result<E> {
        let id: E::Id = bincode::deserialize(bytes)?;
        self.join.load(&id)
    }
}
