//! Time handling for the processing pipeline
//!
//! Provides a clock abstraction so that time-dependent behavior (the
//! calibration cache refresh throttle in particular) can be driven by a
//! deterministic clock in tests instead of the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Timestamp in milliseconds since the Unix epoch.
///
/// Both message receive times and calibration validity boundaries use this
/// representation, so "which record was in effect when this sample arrived"
/// is a plain integer comparison.
pub type Timestamp = u64;

/// Source of time for the pipeline.
///
/// Implementations must be shareable across the producer threads that drive
/// the pipeline concurrently.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs a test clock).
    fn is_wall_clock(&self) -> bool;
}

/// System wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing.
///
/// Interior-mutable so a test can keep advancing the clock while the cache
/// holds a shared reference to it.
#[derive(Debug, Default)]
pub struct FixedTime {
    now_ms: AtomicU64,
}

impl FixedTime {
    /// Create a clock frozen at `timestamp`.
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            now_ms: AtomicU64::new(timestamp),
        }
    }

    /// Move the clock to an absolute timestamp.
    pub fn set(&self, timestamp: Timestamp) {
        self.now_ms.store(timestamp, Ordering::SeqCst);
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_time_advances() {
        let time = FixedTime::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);

        time.set(10_000);
        assert_eq!(time.now(), 10_000);
    }

    #[test]
    fn fixed_time_shared_across_threads() {
        use std::sync::Arc;

        let time = Arc::new(FixedTime::new(0));
        let clock: Arc<dyn TimeSource> = time.clone();

        time.advance(250);
        assert_eq!(clock.now(), 250);
    }

    #[test]
    fn system_clock_is_wall_clock() {
        let clock = SystemClock;
        assert!(clock.is_wall_clock());
        assert!(clock.now() > 0);
    }
}
