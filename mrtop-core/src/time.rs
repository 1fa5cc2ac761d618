//! Time handling
//!
//! Notifications and model state are stamped with millisecond timestamps.
//! The engine never reads a clock on its own: callers pass `now` into every
//! operation, usually from a [`TimeSource`].
//! - [`SystemTime`] for hosts with a wall clock
//! - [`FixedTime`] for tests and replay

/// Timestamp in milliseconds since epoch (or an arbitrary monotonic origin)
pub type Timestamp = u64;

/// Source of time for the host loop
pub trait TimeSource {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone, Copy)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Start the clock at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move the clock forward
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Milliseconds elapsed between two timestamps, zero if the clock went backwards
pub fn delta_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}

/// Elapsed time in seconds as used by the thermal time constants
pub fn delta_secs(earlier: Timestamp, later: Timestamp) -> f32 {
    delta_ms(earlier, later) as f32 / crate::constants::time::MS_PER_SECOND as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let mut time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn deltas_saturate_on_backwards_clock() {
        assert_eq!(delta_ms(2000, 1000), 0);
        assert_eq!(delta_ms(1000, 2500), 1500);
        assert_eq!(delta_secs(0, 30_000), 30.0);
    }
}
