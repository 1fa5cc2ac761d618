//! Latest-value cache of external sources
//!
//! Holds the most recent normalised reading per `(source, quantity)`. The
//! cache never expires entries itself; staleness is judged at lookup time
//! against the validity window of whoever asks.

use alloc::collections::BTreeMap;

use crate::events::{Notification, QuantityKind, ReadingValue, SourceId};
use crate::time::{delta_ms, Timestamp};

/// Last reading of one source
#[derive(Debug, Clone, PartialEq)]
pub struct CachedReading {
    /// Value in canonical units
    pub value: ReadingValue,
    /// Time the source produced the value
    pub timestamp: Timestamp,
    /// Availability flag of the last notification
    pub available: bool,
}

impl CachedReading {
    /// True if the reading is available and no older than `ttl_ms` at `now`
    pub fn is_fresh(&self, now: Timestamp, ttl_ms: u64) -> bool {
        self.available && delta_ms(self.timestamp, now) <= ttl_ms
    }
}

/// Map of the latest reading per source and quantity
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    readings: BTreeMap<SourceId, BTreeMap<QuantityKind, CachedReading>>,
}

impl SourceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a notification, replacing any older value for the same key.
    ///
    /// Returns false if the notification is older than what is cached.
    pub fn ingest(&mut self, notification: &Notification) -> bool {
        let per_source = self.readings.entry(notification.source_id.clone()).or_default();
        if let Some(existing) = per_source.get(&notification.quantity) {
            if existing.timestamp > notification.timestamp {
                return false;
            }
        }
        per_source.insert(
            notification.quantity,
            CachedReading {
                value: notification.normalized(),
                timestamp: notification.timestamp,
                available: notification.available,
            },
        );
        true
    }

    /// Raw lookup without freshness checks
    pub fn get(&self, source_id: &str, quantity: QuantityKind) -> Option<&CachedReading> {
        self.readings.get(source_id)?.get(&quantity)
    }

    /// Reading that is available and within `ttl_ms`
    pub fn fresh(
        &self,
        source_id: &str,
        quantity: QuantityKind,
        now: Timestamp,
        ttl_ms: u64,
    ) -> Option<&CachedReading> {
        self.get(source_id, quantity).filter(|r| r.is_fresh(now, ttl_ms))
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.readings.values().map(BTreeMap::len).sum()
    }

    /// True if nothing has been ingested
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
