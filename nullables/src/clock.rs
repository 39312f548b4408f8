//! Nullable clock: deterministic time for testing.

use coinage_types::time::SECONDS_PER_DAY;
use coinage_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. It is `Sync`, so one clock can
/// drive several threads in concurrency tests.
#[derive(Debug, Default)]
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }

    /// Advance time by a number of seconds, saturating at the end of time.
    pub fn advance(&self, secs: u64) -> Timestamp {
        let previous = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            })
            .unwrap_or_else(|t| t);
        Timestamp::new(previous.saturating_add(secs))
    }

    /// Advance time by whole days.
    pub fn advance_days(&self, days: u64) -> Timestamp {
        self.advance(days.saturating_mul(SECONDS_PER_DAY))
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }
}
