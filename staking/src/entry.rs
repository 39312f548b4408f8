//! A single stake deposit.

use coinage_types::{Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

/// One stake deposit, aging independently from its own start time.
///
/// `amount` and `start_time` never change. `rewarded_until` starts equal to
/// `start_time` and only moves forward when a reward claim consumes age.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEntry {
    amount: TokenAmount,
    start_time: Timestamp,
    rewarded_until: Timestamp,
}

impl StakeEntry {
    pub fn new(amount: TokenAmount, start_time: Timestamp) -> Self {
        Self {
            amount,
            start_time,
            rewarded_until: start_time,
        }
    }

    pub fn amount(&self) -> TokenAmount {
        self.amount
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Age before this instant has already been paid out.
    pub fn rewarded_until(&self) -> Timestamp {
        self.rewarded_until
    }

    /// Never moves the watermark backwards.
    pub(crate) fn advance_rewarded_until(&mut self, to: Timestamp) {
        if to > self.rewarded_until {
            self.rewarded_until = to;
        }
    }
}
