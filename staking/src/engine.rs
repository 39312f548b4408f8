//! Coin-age and reward computation.
//!
//! Everything here is a pure function of the stake entries, the parameters
//! and the supplied `now`; state changes live in [`crate::contract`].
//!
//! Fixed-point convention: amounts are raw units (`10^18` per token), the
//! annual rate is scaled by `10^18`, and coin-age is raw-units × whole days.
//! With `stake_precision = 18` the denominator `365 × 10^18` cancels both the
//! rate scale and the per-day unit, so the reward comes out in raw units.

use std::sync::Arc;

use coinage_types::time::SECONDS_PER_DAY;
use coinage_types::{StakingParams, Timestamp, TokenAmount, U256};

use crate::entry::StakeEntry;
use crate::error::StakingError;

/// Whole days of unrewarded age for one entry, and where its reward
/// watermark moves if those days are paid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryAge {
    pub days: u64,
    pub rewarded_until: Timestamp,
}

/// Result of evaluating an account's entries at one instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accrual {
    pub coin_age: U256,
    pub reward: TokenAmount,
    /// New reward watermark per entry, in entry order.
    pub watermarks: Vec<Timestamp>,
}

/// Computes coin-age and proof-of-stake rewards under fixed parameters.
#[derive(Clone, Debug)]
pub struct RewardEngine {
    params: Arc<StakingParams>,
}

impl RewardEngine {
    pub fn new(params: Arc<StakingParams>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    /// The annual interest rate, scaled by `10^18`. Flat for now.
    pub fn annual_interest(&self) -> U256 {
        self.params.max_interest_rate
    }

    /// Unrewarded whole-day age of `entry` at `now`.
    ///
    /// An entry younger than `stake_min_age` (measured from its original start)
    /// earns nothing. Age is counted from the reward watermark and capped at
    /// `stake_max_age`; age beyond the cap is forfeited when paid out. Only
    /// whole days are consumed, so a partial day carries over to the next claim.
    pub fn entry_age(&self, entry: &StakeEntry, now: Timestamp) -> EntryAge {
        let unchanged = EntryAge {
            days: 0,
            rewarded_until: entry.rewarded_until(),
        };
        let eligible_at = entry.start_time().saturating_add_secs(self.params.stake_min_age);
        if now < eligible_at {
            return unchanged;
        }

        let elapsed = entry.rewarded_until().elapsed_since(now);
        if elapsed > self.params.stake_max_age {
            return EntryAge {
                days: self.params.stake_max_age / SECONDS_PER_DAY,
                rewarded_until: now,
            };
        }

        let days = elapsed / SECONDS_PER_DAY;
        EntryAge {
            days,
            rewarded_until: entry
                .rewarded_until()
                .saturating_add_secs(days * SECONDS_PER_DAY),
        }
    }

    /// Aggregate coin-age: Σ amount × days over all eligible entries.
    pub fn coin_age(&self, entries: &[StakeEntry], now: Timestamp) -> Result<U256, StakingError> {
        entries.iter().try_fold(U256::zero(), |total, entry| {
            let days = self.entry_age(entry, now).days;
            let weight = entry
                .amount()
                .raw()
                .checked_mul(U256::from(days))
                .ok_or(StakingError::Overflow)?;
            total.checked_add(weight).ok_or(StakingError::Overflow)
        })
    }

    /// `coin_age × rate / (365 × 10^precision)`, floored. Zero when no age.
    pub fn reward_for_coin_age(&self, coin_age: U256) -> Result<TokenAmount, StakingError> {
        if coin_age.is_zero() {
            return Ok(TokenAmount::ZERO);
        }
        let numerator = coin_age
            .checked_mul(self.annual_interest())
            .ok_or(StakingError::Overflow)?;
        Ok(TokenAmount::new(numerator / self.params.reward_denominator()))
    }

    /// Reward currently claimable for `entries` at `now`.
    pub fn proof_of_stake_reward(
        &self,
        entries: &[StakeEntry],
        now: Timestamp,
    ) -> Result<TokenAmount, StakingError> {
        self.reward_for_coin_age(self.coin_age(entries, now)?)
    }

    /// Coin-age, reward and the watermarks that consume exactly that age.
    pub fn accrue(&self, entries: &[StakeEntry], now: Timestamp) -> Result<Accrual, StakingError> {
        let coin_age = self.coin_age(entries, now)?;
        let reward = self.reward_for_coin_age(coin_age)?;
        let watermarks = entries
            .iter()
            .map(|e| self.entry_age(e, now).rewarded_until)
            .collect();
        Ok(Accrual {
            coin_age,
            reward,
            watermarks,
        })
    }
}
