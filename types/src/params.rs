//! Staking parameters.
//!
//! Parameters are fixed at initialization and never change afterwards. They
//! are shared by `Arc` between the reward engine and the contract rather than
//! living in global state.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::amount::{TokenAmount, TOKEN_UNIT};
use crate::error::TypesError;
use crate::time::Timestamp;

/// Fixed-point scale of [`StakingParams::max_interest_rate`] (`10^18` = 100%).
pub const INTEREST_RATE_DECIMALS: u32 = 18;

/// 10% APY under the 18-decimal scale: `0.10 * 10^18 = 10^17`.
pub const MAX_INTEREST_RATE: U256 = U256([100_000_000_000_000_000, 0, 0, 0]);

/// Days per reward year in the interest formula.
pub const DAYS_PER_YEAR: u64 = 365;

/// Largest precision for which `365 * 10^precision` fits in 256 bits.
pub const MAX_STAKE_PRECISION: u32 = 74;

/// Supply floor and ceiling enforced by every mint and burn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyBounds {
    pub min_total_supply: TokenAmount,
    pub max_total_supply: TokenAmount,
}

impl SupplyBounds {
    pub fn new(min_total_supply: TokenAmount, max_total_supply: TokenAmount) -> Self {
        Self {
            min_total_supply,
            max_total_supply,
        }
    }

    /// Whether `supply` lies inside `[min, max]`.
    pub fn contains(&self, supply: TokenAmount) -> bool {
        supply >= self.min_total_supply && supply <= self.max_total_supply
    }
}

/// The caller-supplied half of the parameters, as passed to `initialize`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    pub min_total_supply: TokenAmount,
    pub max_total_supply: TokenAmount,
    /// Dwell time (seconds) before an entry accrues any age.
    pub stake_min_age: u64,
    /// Cap (seconds) on the age a single entry can accrue per reward claim.
    pub stake_max_age: u64,
    /// Decimal exponent divided out of the reward rate.
    pub stake_precision: u32,
}

/// The complete, immutable staking configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    pub bounds: SupplyBounds,
    /// When rewards became computable. Set to "now" at initialization.
    pub stake_start_time: Timestamp,
    pub stake_min_age: u64,
    pub stake_max_age: u64,
    /// Annual rate scaled by `10^18`.
    pub max_interest_rate: U256,
    /// Smallest amount a single stake may lock.
    pub stake_min_amount: TokenAmount,
    pub stake_precision: u32,
}

impl StakingParams {
    /// Validate `init` and complete it with the fixed rate and minimum stake.
    pub fn from_init(init: &InitParams, stake_start_time: Timestamp) -> Result<Self, TypesError> {
        if init.min_total_supply > init.max_total_supply {
            return Err(TypesError::InvalidParams(format!(
                "min_total_supply {} exceeds max_total_supply {}",
                init.min_total_supply, init.max_total_supply
            )));
        }
        if init.stake_max_age == 0 {
            return Err(TypesError::InvalidParams(
                "stake_max_age must be non-zero".to_string(),
            ));
        }
        if init.stake_min_age > init.stake_max_age {
            return Err(TypesError::InvalidParams(format!(
                "stake_min_age {}s exceeds stake_max_age {}s",
                init.stake_min_age, init.stake_max_age
            )));
        }
        if init.stake_precision > MAX_STAKE_PRECISION {
            return Err(TypesError::InvalidParams(format!(
                "stake_precision {} exceeds maximum {}",
                init.stake_precision, MAX_STAKE_PRECISION
            )));
        }
        Ok(Self {
            bounds: SupplyBounds::new(init.min_total_supply, init.max_total_supply),
            stake_start_time,
            stake_min_age: init.stake_min_age,
            stake_max_age: init.stake_max_age,
            max_interest_rate: MAX_INTEREST_RATE,
            stake_min_amount: TOKEN_UNIT,
            stake_precision: init.stake_precision,
        })
    }

    /// `365 * 10^stake_precision`, the reward denominator.
    pub fn reward_denominator(&self) -> U256 {
        U256::from(DAYS_PER_YEAR) * U256::exp10(self.stake_precision as usize)
    }
}
