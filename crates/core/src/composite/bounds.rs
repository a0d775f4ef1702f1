//! Range boundary builder
//!
//! Turns a logical `[start, end]` request into the two binary boundaries a
//! storage scan needs. Both boundaries are inclusive at the byte level; the
//! logical inclusivity is expressed by the equality marker on the last
//! component:
//!
//! | side | inclusive | marker | sorts |
//! |------|-----------|--------|-------|
//! | low  | yes | `GreaterThanEqual` | before every key equal to start |
//! | low  | no  | `LessThanEqual`    | after every key equal to start (next boundary strictly after start) |
//! | high | yes | `LessThanEqual`    | after every key equal to end |
//! | high | no  | `GreaterThanEqual` | before every key equal to end |
//!
//! A missing side is open: the map's open boundary, which is empty unless
//! the map lives under a prefix.
//!
//! Start and end are always the logical low and high of the range. With
//! `reverse` the scan runs from high to low; a reverse request given as
//! (high, low) is accepted and normalized.

use std::cmp::Ordering;

use super::codec::CompositeKey;
use super::component::{Component, ComponentEquality};
use super::schema::CompositeSchema;
use crate::error::{Error, Result};

/// Binary boundaries of a non-empty scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundPair {
    /// Lowest admissible column name (empty = open)
    pub low: Vec<u8>,
    /// Highest admissible column name (empty = open)
    pub high: Vec<u8>,
    /// Iterate from high to low
    pub reverse: bool,
}

/// Outcome of boundary construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanBounds {
    /// The range is provably empty; no scan should be issued
    Empty,
    /// Scan between these boundaries
    Range(BoundPair),
}

impl ScanBounds {
    /// True for the "no scan required" sentinel
    pub fn is_empty(&self) -> bool {
        matches!(self, ScanBounds::Empty)
    }
}

/// Build the scan boundaries for a sub-range of a wide map
///
/// # Errors
///
/// - `InvalidRange` if a forward request has `start > end`
/// - `InvalidInput` if a bound does not fit the schema
pub fn build_bounds(
    schema: &CompositeSchema,
    start: Option<&[Component]>,
    inclusive_start: bool,
    end: Option<&[Component]>,
    inclusive_end: bool,
    reverse: bool,
) -> Result<ScanBounds> {
    if let Some(s) = start {
        schema.check(s, true)?;
    }
    if let Some(e) = end {
        schema.check(e, true)?;
    }

    let (mut start, mut inclusive_start, mut end, mut inclusive_end) =
        (start, inclusive_start, end, inclusive_end);

    if let (Some(s), Some(e)) = (start, end) {
        match compare_bounds(s, e) {
            Ordering::Greater if reverse => {
                std::mem::swap(&mut start, &mut end);
                std::mem::swap(&mut inclusive_start, &mut inclusive_end);
            }
            Ordering::Greater => {
                return Err(Error::invalid_range(format!(
                    "start {} must not be greater than end {}",
                    render(s),
                    render(e)
                )));
            }
            Ordering::Equal if !(inclusive_start && inclusive_end) => {
                return Ok(ScanBounds::Empty);
            }
            _ => {}
        }
    }

    let low = match start {
        Some(s) => {
            let marker = if inclusive_start {
                ComponentEquality::GreaterThanEqual
            } else {
                ComponentEquality::LessThanEqual
            };
            schema.encode_bound(s, marker)?
        }
        None => schema.open_low(),
    };
    let high = match end {
        Some(e) => {
            let marker = if inclusive_end {
                ComponentEquality::LessThanEqual
            } else {
                ComponentEquality::GreaterThanEqual
            };
            schema.encode_bound(e, marker)?
        }
        None => schema.open_high(),
    };

    // Partial bounds can cross even when start <= end tuple-wise
    if !low.is_empty() && !high.is_empty() && low > high {
        return Ok(ScanBounds::Empty);
    }

    Ok(ScanBounds::Range(BoundPair { low, high, reverse }))
}

fn compare_bounds(a: &[Component], b: &[Component]) -> Ordering {
    CompositeKey::exact(a.to_vec())
        .encode()
        .cmp(&CompositeKey::exact(b.to_vec()).encode())
}

fn render(components: &[Component]) -> String {
    let parts: Vec<String> = components.iter().map(|c| c.to_string()).collect();
    format!("({})", parts.join(", "))
}
