//! Schema of the composite column names used by one wide map
//!
//! A schema fixes the component types of the sub-key and, for wide maps
//! stored inside an entity row, a constant prefix (the property name) that
//! every column of the map starts with.

use super::codec::CompositeKey;
use super::component::{Component, ComponentEquality, ComponentType};
use crate::error::{Error, Result};

/// Component types of a wide map's sub-key, with an optional constant prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSchema {
    prefix: Vec<Component>,
    types: Vec<ComponentType>,
}

impl CompositeSchema {
    /// Schema without a prefix
    pub fn new(types: Vec<ComponentType>) -> Self {
        Self {
            prefix: Vec::new(),
            types,
        }
    }

    /// Schema whose columns all start with `prefix`
    pub fn with_prefix(prefix: Vec<Component>, types: Vec<ComponentType>) -> Self {
        Self { prefix, types }
    }

    /// Number of sub-key components
    pub fn arity(&self) -> usize {
        self.types.len()
    }

    /// Sub-key component types
    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }

    /// Constant prefix components
    pub fn prefix(&self) -> &[Component] {
        &self.prefix
    }

    /// Check that `components` is a non-empty leading slice of this schema
    ///
    /// Full keys must pass `components.len() == arity()`; boundaries may be
    /// partial.
    pub fn check(&self, components: &[Component], allow_partial: bool) -> Result<()> {
        if components.len() > self.types.len()
            || (!allow_partial && components.len() != self.types.len())
            || components.is_empty()
        {
            return Err(Error::invalid_input(format!(
                "expected {} key component(s), got {}",
                self.types.len(),
                components.len()
            )));
        }
        for (i, (c, t)) in components.iter().zip(&self.types).enumerate() {
            if c.component_type() != *t {
                return Err(Error::invalid_input(format!(
                    "key component {} has type {:?}, schema expects {:?}",
                    i,
                    c.component_type(),
                    t
                )));
            }
        }
        Ok(())
    }

    /// Encode a full sub-key as a stored column name (all markers `Equal`)
    pub fn encode_exact(&self, components: &[Component]) -> Result<Vec<u8>> {
        self.check(components, false)?;
        let mut all = self.prefix.clone();
        all.extend_from_slice(components);
        Ok(CompositeKey::exact(all).encode())
    }

    /// Encode a (possibly partial) sub-key as a scan boundary
    ///
    /// `last` is applied to the final component. With no components the
    /// marker is applied to the final prefix component, which bounds the
    /// whole map; with neither prefix nor components the boundary is open
    /// (empty).
    pub fn encode_bound(&self, components: &[Component], last: ComponentEquality) -> Result<Vec<u8>> {
        if !components.is_empty() {
            self.check(components, true)?;
        }
        let mut all = self.prefix.clone();
        all.extend_from_slice(components);
        if all.is_empty() {
            return Ok(Vec::new());
        }
        Ok(CompositeKey::bound(all, last).encode())
    }

    /// Lowest boundary of the map (open when there is no prefix)
    pub fn open_low(&self) -> Vec<u8> {
        if self.prefix.is_empty() {
            return Vec::new();
        }
        CompositeKey::bound(self.prefix.clone(), ComponentEquality::GreaterThanEqual).encode()
    }

    /// Highest boundary of the map (open when there is no prefix)
    pub fn open_high(&self) -> Vec<u8> {
        if self.prefix.is_empty() {
            return Vec::new();
        }
        CompositeKey::bound(self.prefix.clone(), ComponentEquality::LessThanEqual).encode()
    }

    /// Decode a stored column name back into sub-key components
    ///
    /// # Errors
    ///
    /// `MalformedKey` if the bytes do not match prefix + schema, or if any
    /// component carries a boundary marker.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<Component>> {
        let mut types: Vec<ComponentType> =
            self.prefix.iter().map(|c| c.component_type()).collect();
        types.extend_from_slice(&self.types);

        let key = CompositeKey::decode(bytes, &types)?;
        if !key.is_exact() {
            return Err(Error::malformed_key(
                "stored column name carries a boundary marker",
            ));
        }
        let mut components = key.into_components();
        let rest = components.split_off(self.prefix.len());
        if components != self.prefix {
            return Err(Error::malformed_key(format!(
                "column prefix {:?} does not match {:?}",
                components, self.prefix
            )));
        }
        Ok(rest)
    }
}
