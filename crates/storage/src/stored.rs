//! Storage-layer column wrapper with TTL support
//!
//! TTL is a storage concern: callers hand a `Duration` to the store and
//! never see it again. `StoredColumn` pairs the raw value with the write
//! time and the TTL so expiry can be decided at read time.

use std::time::{Duration, SystemTime};

/// A stored column value with optional TTL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredColumn {
    value: Vec<u8>,
    written_at: SystemTime,
    ttl: Option<Duration>,
}

impl StoredColumn {
    /// Create a stored column written now
    pub fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self::with_written_at(value, SystemTime::now(), ttl)
    }

    /// Create a stored column with an explicit write time
    pub fn with_written_at(value: Vec<u8>, written_at: SystemTime, ttl: Option<Duration>) -> Self {
        StoredColumn {
            value,
            written_at,
            ttl,
        }
    }

    /// Get the value
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Get the TTL
    #[inline]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Check if this column has expired
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => SystemTime::now()
                .duration_since(self.written_at)
                .map(|age| age >= ttl)
                .unwrap_or(false),
            None => false,
        }
    }

    /// Time at which the column expires, if it has a TTL
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.ttl.and_then(|ttl| self.written_at.checked_add(ttl))
    }
}
