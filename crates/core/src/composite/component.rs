//! Typed key components and their comparator markers

use std::fmt;
use uuid::Uuid;

/// One typed component of a composite key
///
/// The derived `Ord` is the tuple-wise comparator the binary encoding must
/// agree with: within a single type, values compare naturally (signed
/// integers numerically, text and bytes lexicographically by byte, UUIDs by
/// their 16 bytes).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    /// Boolean (false < true)
    Bool(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// UUID, compared by raw bytes
    Uuid(Uuid),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Component {
    /// Type marker of this component
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Bool(_) => ComponentType::Bool,
            Component::Int(_) => ComponentType::Int,
            Component::Long(_) => ComponentType::Long,
            Component::Uuid(_) => ComponentType::Uuid,
            Component::Text(_) => ComponentType::Text,
            Component::Bytes(_) => ComponentType::Bytes,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Bool(v) => write!(f, "{}", v),
            Component::Int(v) => write!(f, "{}", v),
            Component::Long(v) => write!(f, "{}", v),
            Component::Uuid(v) => write!(f, "{}", v),
            Component::Text(v) => write!(f, "{:?}", v),
            Component::Bytes(v) => write!(f, "{:?}", v),
        }
    }
}

/// Comparator-relevant type marker, written ahead of every encoded component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// `Component::Bool`
    Bool,
    /// `Component::Int`
    Int,
    /// `Component::Long`
    Long,
    /// `Component::Uuid`
    Uuid,
    /// `Component::Text`
    Text,
    /// `Component::Bytes`
    Bytes,
}

impl ComponentType {
    /// Byte tag written into the encoding
    pub fn as_byte(&self) -> u8 {
        match self {
            ComponentType::Bool => 0x01,
            ComponentType::Int => 0x02,
            ComponentType::Long => 0x03,
            ComponentType::Uuid => 0x04,
            ComponentType::Text => 0x05,
            ComponentType::Bytes => 0x06,
        }
    }

    /// Parse a byte tag
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ComponentType::Bool),
            0x02 => Some(ComponentType::Int),
            0x03 => Some(ComponentType::Long),
            0x04 => Some(ComponentType::Uuid),
            0x05 => Some(ComponentType::Text),
            0x06 => Some(ComponentType::Bytes),
            _ => None,
        }
    }
}

/// Equality marker written after every encoded component
///
/// Stored keys always carry `Equal`. The other two markers only appear on
/// the last component of a scan boundary and decide where the boundary sorts
/// relative to the stored keys that share its components:
///
/// ```text
/// GreaterThanEqual (0x00)  <  Equal (0x01)  <  LessThanEqual (0x02)
/// ```
///
/// A `GreaterThanEqual` boundary sorts before every stored key sharing its
/// prefix, so a scan starting there admits all of them. A `LessThanEqual`
/// boundary sorts after every such key, so a scan ending there admits all
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentEquality {
    /// Boundary sorting before all keys that share its components
    GreaterThanEqual,
    /// Exact component, the only marker that is ever persisted
    Equal,
    /// Boundary sorting after all keys that share its components
    LessThanEqual,
}

impl ComponentEquality {
    /// Marker byte
    pub fn as_byte(&self) -> u8 {
        match self {
            ComponentEquality::GreaterThanEqual => 0x00,
            ComponentEquality::Equal => 0x01,
            ComponentEquality::LessThanEqual => 0x02,
        }
    }

    /// Parse a marker byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(ComponentEquality::GreaterThanEqual),
            0x01 => Some(ComponentEquality::Equal),
            0x02 => Some(ComponentEquality::LessThanEqual),
            _ => None,
        }
    }
}
