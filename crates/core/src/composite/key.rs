//! Mapping between Rust sub-key types and composite components
//!
//! Scalars map to a single component; tuples map to one component per
//! element, in order, so `(i64, String)` sorts by the integer first.

use uuid::Uuid;

use super::component::{Component, ComponentType};
use super::schema::CompositeSchema;
use crate::error::{Error, Result};

/// A type usable as one component of a wide map sub-key
pub trait KeyComponent: Sized + Clone {
    /// Type marker of the component
    const TYPE: ComponentType;

    /// Convert to a component
    fn to_component(&self) -> Component;

    /// Convert back from a decoded component
    fn from_component(component: Component) -> Result<Self>;
}

/// A wide map sub-key
pub trait WideMapKey: Sized + Clone {
    /// Component types, in key order
    fn component_types() -> Vec<ComponentType>;

    /// Components, in key order
    fn to_components(&self) -> Vec<Component>;

    /// Rebuild from decoded components
    fn from_components(components: Vec<Component>) -> Result<Self>;

    /// Schema for a map keyed by this type
    fn schema() -> CompositeSchema {
        CompositeSchema::new(Self::component_types())
    }
}

fn mismatch(expected: ComponentType, found: &Component) -> Error {
    Error::malformed_key(format!(
        "expected {:?} component, found {:?}",
        expected,
        found.component_type()
    ))
}

macro_rules! key_component {
    ($ty:ty, $variant:ident) => {
        impl KeyComponent for $ty {
            const TYPE: ComponentType = ComponentType::$variant;

            fn to_component(&self) -> Component {
                Component::$variant(self.clone())
            }

            fn from_component(component: Component) -> Result<Self> {
                match component {
                    Component::$variant(v) => Ok(v),
                    other => Err(mismatch(Self::TYPE, &other)),
                }
            }
        }

        impl WideMapKey for $ty {
            fn component_types() -> Vec<ComponentType> {
                vec![<$ty as KeyComponent>::TYPE]
            }

            fn to_components(&self) -> Vec<Component> {
                vec![self.to_component()]
            }

            fn from_components(components: Vec<Component>) -> Result<Self> {
                let mut it = components.into_iter();
                match (it.next(), it.next()) {
                    (Some(c), None) => <$ty as KeyComponent>::from_component(c),
                    _ => Err(Error::malformed_key("expected exactly one key component")),
                }
            }
        }
    };
}

key_component!(bool, Bool);
key_component!(i32, Int);
key_component!(i64, Long);
key_component!(Uuid, Uuid);
key_component!(String, Text);
key_component!(Vec<u8>, Bytes);

impl<A: KeyComponent, B: KeyComponent> WideMapKey for (A, B) {
    fn component_types() -> Vec<ComponentType> {
        vec![A::TYPE, B::TYPE]
    }

    fn to_components(&self) -> Vec<Component> {
        vec![self.0.to_component(), self.1.to_component()]
    }

    fn from_components(components: Vec<Component>) -> Result<Self> {
        let mut it = components.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(a), Some(b), None) => Ok((A::from_component(a)?, B::from_component(b)?)),
            _ => Err(Error::malformed_key("expected exactly two key components")),
        }
    }
}

impl<A: KeyComponent, B: KeyComponent, C: KeyComponent> WideMapKey for (A, B, C) {
    fn component_types() -> Vec<ComponentType> {
        vec![A::TYPE, B::TYPE, C::TYPE]
    }

    fn to_components(&self) -> Vec<Component> {
        vec![
            self.0.to_component(),
            self.1.to_component(),
            self.2.to_component(),
        ]
    }

    fn from_components(components: Vec<Component>) -> Result<Self> {
        let mut it = components.into_iter();
        match (it.next(), it.next(), it.next(), it.next()) {
            (Some(a), Some(b), Some(c), None) => Ok((
                A::from_component(a)?,
                B::from_component(b)?,
                C::from_component(c)?,
            )),
            _ => Err(Error::malformed_key("expected exactly three key components")),
        }
    }
}
