//! Per-room update throttling
//!
//! Sensor notifications arrive in bursts: a weather update touches half a
//! dozen attributes within milliseconds. The scheduler lets the first one
//! through, then holds every further change until the minimum interval has
//! passed since the last emitted result. All held changes collapse into one
//! calculation at the interval boundary, which reads the newest cached value
//! of each input.
//!
//! ```text
//! t=0s   notify → Now         (compute, record_emit)
//! t=4s   notify → Deferred    (due 30s)
//! t=9s   notify → Deferred    (due 30s, same slot)
//! t=30s  poll   → Ok          (compute once, record_emit)
//! ```
//!
//! The host drives deferred work by calling [`UpdateScheduler::poll`] with the
//! current time; it returns `nb::Error::WouldBlock` until a held update is due.

use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::constants::time::{DEFAULT_MIN_UPDATE_INTERVAL_MS, MIN_UPDATE_INTERVAL_FLOOR_MS};
use crate::time::{delta_ms, Timestamp};

/// Decision for one notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "admission", rename_all = "snake_case")]
pub enum Admission {
    /// Compute immediately
    Now,
    /// Held until `due`
    Deferred {
        /// Interval boundary (ms)
        due: Timestamp,
    },
}

/// Minimum-interval throttle for one room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateScheduler {
    min_interval_ms: u64,
    last_emit: Option<Timestamp>,
    pending: bool,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_UPDATE_INTERVAL_MS)
    }
}

impl UpdateScheduler {
    /// Create a scheduler; intervals below one second are raised to one second
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms: min_interval_ms.max(MIN_UPDATE_INTERVAL_FLOOR_MS),
            last_emit: None,
            pending: false,
        }
    }

    /// Configured interval (ms)
    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Time of the last emitted result
    pub fn last_emit(&self) -> Option<Timestamp> {
        self.last_emit
    }

    /// True while an update is held
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Boundary of the held update, if any
    pub fn next_due(&self) -> Option<Timestamp> {
        if !self.pending {
            return None;
        }
        Some(self.boundary())
    }

    /// An input changed at `now`
    pub fn notify(&mut self, now: Timestamp) -> Admission {
        match self.last_emit {
            Some(last) if delta_ms(last, now) < self.min_interval_ms => {
                self.pending = true;
                Admission::Deferred { due: self.boundary() }
            }
            _ => {
                self.pending = false;
                Admission::Now
            }
        }
    }

    /// Ready when a held update has reached its boundary.
    ///
    /// Consumes the held update; the caller computes and then calls
    /// [`record_emit`](Self::record_emit).
    pub fn poll(&mut self, now: Timestamp) -> nb::Result<(), Infallible> {
        if !self.pending || now < self.boundary() {
            return Err(nb::Error::WouldBlock);
        }
        self.pending = false;
        Ok(())
    }

    /// A result was emitted at `now`
    pub fn record_emit(&mut self, now: Timestamp) {
        self.last_emit = Some(now);
        self.pending = false;
    }

    fn boundary(&self) -> Timestamp {
        self.last_emit
            .map(|last| last.saturating_add(self.min_interval_ms))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_notification_runs_immediately() {
        let mut s = UpdateScheduler::default();
        assert_eq!(s.notify(5_000), Admission::Now);
        assert!(s.next_due().is_none());
    }

    #[test]
    fn burst_collapses_into_one_deferred_update() {
        let mut s = UpdateScheduler::new(30_000);
        assert_eq!(s.notify(0), Admission::Now);
        s.record_emit(0);

        assert_eq!(s.notify(4_000), Admission::Deferred { due: 30_000 });
        assert_eq!(s.notify(9_000), Admission::Deferred { due: 30_000 });
        assert_eq!(s.next_due(), Some(30_000));

        assert!(matches!(s.poll(29_999), Err(nb::Error::WouldBlock)));
        assert!(s.poll(30_000).is_ok());
        s.record_emit(30_000);

        // nothing held any more
        assert!(matches!(s.poll(90_000), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn notification_after_interval_runs_immediately() {
        let mut s = UpdateScheduler::new(30_000);
        s.record_emit(0);
        assert_eq!(s.notify(30_000), Admission::Now);
        assert!(!s.is_pending());
    }

    #[test]
    fn interval_has_a_floor() {
        assert_eq!(UpdateScheduler::new(0).min_interval_ms(), MIN_UPDATE_INTERVAL_FLOOR_MS);
    }
}
