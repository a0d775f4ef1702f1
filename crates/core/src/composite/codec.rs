//! Composite key encoding and decoding
//!
//! ## Layout
//!
//! Every component is written as:
//!
//! ```text
//! [type tag: 1 byte][body][equality marker: 1 byte]
//! ```
//!
//! Bodies are order-preserving under unsigned byte comparison:
//! - `Bool`: one byte, 0 or 1
//! - `Int` / `Long`: big-endian with the sign bit flipped
//! - `Uuid`: the 16 raw bytes
//! - `Text` / `Bytes`: escaped (`0x00` becomes `0x00 0xFF`) and terminated by
//!   `0x00 0x01`, so a shorter value that is a prefix of a longer one still
//!   sorts first and no body is a prefix of another
//!
//! Because each body is self-delimiting, two keys over the same schema are
//! ordered by their first differing component, and only then by the marker.

use byteorder::{BigEndian, ByteOrder};
use uuid::Uuid;

use super::component::{Component, ComponentEquality, ComponentType};
use crate::error::{Error, Result};

const ESCAPE: u8 = 0x00;
const ESCAPED_ZERO: u8 = 0xFF;
const TERMINATOR: u8 = 0x01;

/// An immutable sequence of components, each carrying an equality marker
///
/// Exact keys (the ones that are persisted) carry `Equal` on every
/// component. Boundary keys carry `Equal` on all but the last component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    parts: Vec<(Component, ComponentEquality)>,
}

impl CompositeKey {
    /// Key with `Equal` on every component
    pub fn exact(components: Vec<Component>) -> Self {
        Self {
            parts: components
                .into_iter()
                .map(|c| (c, ComponentEquality::Equal))
                .collect(),
        }
    }

    /// Key with `Equal` on every component but the last, which gets `last`
    pub fn bound(components: Vec<Component>, last: ComponentEquality) -> Self {
        let n = components.len();
        Self {
            parts: components
                .into_iter()
                .enumerate()
                .map(|(i, c)| {
                    let eq = if i + 1 == n {
                        last
                    } else {
                        ComponentEquality::Equal
                    };
                    (c, eq)
                })
                .collect(),
        }
    }

    /// Build from explicit (component, marker) pairs
    pub fn from_parts(parts: Vec<(Component, ComponentEquality)>) -> Self {
        Self { parts }
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True if the key has no components
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Components paired with their markers
    pub fn parts(&self) -> &[(Component, ComponentEquality)] {
        &self.parts
    }

    /// Components without markers
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.parts.iter().map(|(c, _)| c)
    }

    /// Drop the markers and return the components
    pub fn into_components(self) -> Vec<Component> {
        self.parts.into_iter().map(|(c, _)| c).collect()
    }

    /// True if every component carries `Equal`
    pub fn is_exact(&self) -> bool {
        self.parts
            .iter()
            .all(|(_, eq)| *eq == ComponentEquality::Equal)
    }

    /// Encode to the binary layout
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.parts.len() * 10);
        for (component, eq) in &self.parts {
            encode_component(&mut buf, component, *eq);
        }
        buf
    }

    /// Decode a binary key whose components must have exactly `types`
    ///
    /// # Errors
    ///
    /// `MalformedKey` on truncation, trailing bytes, unknown or unexpected
    /// type tags, bad escapes, invalid UTF-8, or an unknown marker byte.
    pub fn decode(bytes: &[u8], types: &[ComponentType]) -> Result<Self> {
        let mut reader = Reader { bytes, pos: 0 };
        let mut parts = Vec::with_capacity(types.len());
        for (index, expected) in types.iter().enumerate() {
            let tag = reader.byte(index)?;
            let actual = ComponentType::from_byte(tag).ok_or_else(|| {
                Error::malformed_key(format!(
                    "unknown type tag 0x{:02x} at component {}",
                    tag, index
                ))
            })?;
            if actual != *expected {
                return Err(Error::malformed_key(format!(
                    "component {} has type {:?}, expected {:?}",
                    index, actual, expected
                )));
            }
            let component = reader.body(actual, index)?;
            let marker = reader.byte(index)?;
            let eq = ComponentEquality::from_byte(marker).ok_or_else(|| {
                Error::malformed_key(format!(
                    "unknown equality marker 0x{:02x} at component {}",
                    marker, index
                ))
            })?;
            parts.push((component, eq));
        }
        if reader.pos != bytes.len() {
            return Err(Error::malformed_key(format!(
                "{} trailing byte(s) after {} component(s)",
                bytes.len() - reader.pos,
                types.len()
            )));
        }
        Ok(Self { parts })
    }
}

/// Encode (component, marker) pairs
pub fn encode_components(parts: &[(Component, ComponentEquality)]) -> Vec<u8> {
    let mut buf = Vec::new();
    for (component, eq) in parts {
        encode_component(&mut buf, component, *eq);
    }
    buf
}

/// Decode a binary key into components of the given types
pub fn decode_components(bytes: &[u8], types: &[ComponentType]) -> Result<Vec<Component>> {
    Ok(CompositeKey::decode(bytes, types)?.into_components())
}

fn encode_component(buf: &mut Vec<u8>, component: &Component, eq: ComponentEquality) {
    buf.push(component.component_type().as_byte());
    match component {
        Component::Bool(v) => buf.push(u8::from(*v)),
        Component::Int(v) => {
            let mut tmp = [0u8; 4];
            BigEndian::write_u32(&mut tmp, (*v as u32) ^ 0x8000_0000);
            buf.extend_from_slice(&tmp);
        }
        Component::Long(v) => {
            let mut tmp = [0u8; 8];
            BigEndian::write_u64(&mut tmp, (*v as u64) ^ 0x8000_0000_0000_0000);
            buf.extend_from_slice(&tmp);
        }
        Component::Uuid(v) => buf.extend_from_slice(v.as_bytes()),
        Component::Text(v) => encode_escaped(buf, v.as_bytes()),
        Component::Bytes(v) => encode_escaped(buf, v),
    }
    buf.push(eq.as_byte());
}

fn encode_escaped(buf: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        if b == ESCAPE {
            buf.push(ESCAPE);
            buf.push(ESCAPED_ZERO);
        } else {
            buf.push(b);
        }
    }
    buf.push(ESCAPE);
    buf.push(TERMINATOR);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn truncated(&self, index: usize) -> Error {
        Error::malformed_key(format!(
            "truncated at byte {} while reading component {}",
            self.pos, index
        ))
    }

    fn byte(&mut self, index: usize) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or_else(|| self.truncated(index))?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize, index: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(self.truncated(index));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn body(&mut self, ty: ComponentType, index: usize) -> Result<Component> {
        match ty {
            ComponentType::Bool => match self.byte(index)? {
                0 => Ok(Component::Bool(false)),
                1 => Ok(Component::Bool(true)),
                other => Err(Error::malformed_key(format!(
                    "invalid bool byte 0x{:02x} at component {}",
                    other, index
                ))),
            },
            ComponentType::Int => {
                let raw = BigEndian::read_u32(self.take(4, index)?);
                Ok(Component::Int((raw ^ 0x8000_0000) as i32))
            }
            ComponentType::Long => {
                let raw = BigEndian::read_u64(self.take(8, index)?);
                Ok(Component::Long((raw ^ 0x8000_0000_0000_0000) as i64))
            }
            ComponentType::Uuid => {
                let raw = self.take(16, index)?;
                let uuid = Uuid::from_slice(raw)
                    .map_err(|e| Error::malformed_key(format!("component {}: {}", index, e)))?;
                Ok(Component::Uuid(uuid))
            }
            ComponentType::Text => {
                let raw = self.escaped(index)?;
                let text = String::from_utf8(raw).map_err(|_| {
                    Error::malformed_key(format!("component {} is not valid UTF-8", index))
                })?;
                Ok(Component::Text(text))
            }
            ComponentType::Bytes => Ok(Component::Bytes(self.escaped(index)?)),
        }
    }

    fn escaped(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let b = self.byte(index)?;
            if b != ESCAPE {
                out.push(b);
                continue;
            }
            match self.byte(index)? {
                ESCAPED_ZERO => out.push(0),
                TERMINATOR => return Ok(out),
                other => {
                    return Err(Error::malformed_key(format!(
                        "invalid escape 0x00 0x{:02x} in component {}",
                        other, index
                    )))
                }
            }
        }
    }
}
