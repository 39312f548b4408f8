//! Logical clock readings.
//!
//! Every operation takes "now" as an explicit argument; the engine never reads
//! the system clock itself. [`Timestamp::now`] exists for front ends that want
//! wall-clock time as their logical clock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::TypesError;

/// Seconds in one coin-age day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch. A stake start time of zero means "staking not started".
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Wall-clock time. Fails if the system clock reads before 1970, since
    /// the epoch itself means "staking not started".
    pub fn now() -> Result<Self, TypesError> {
        Self::from_system_time(SystemTime::now())
    }

    pub fn from_system_time(time: SystemTime) -> Result<Self, TypesError> {
        time.duration_since(UNIX_EPOCH)
            .map(|d| Self(d.as_secs()))
            .map_err(|e| TypesError::ClockBeforeEpoch(e.duration().as_secs()))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_epoch(&self) -> bool {
        self.0 == 0
    }

    /// Seconds from `self` to `now`, zero if `now` is earlier.
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// `self + secs`, saturating at `u64::MAX`.
    pub fn saturating_add_secs(&self, secs: u64) -> Timestamp {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn clock_before_epoch_is_an_error() {
        let before = UNIX_EPOCH - Duration::from_secs(5);
        assert_eq!(
            Timestamp::from_system_time(before),
            Err(TypesError::ClockBeforeEpoch(5))
        );
    }

    #[test]
    fn system_time_converts_to_seconds() {
        let t = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(Timestamp::from_system_time(t), Ok(Timestamp::new(86_400)));
    }
}
