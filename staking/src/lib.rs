//! Coin-age proof-of-stake reward accounting.
//!
//! A staker locks balance in discrete entries; each entry ages independently
//! from its own start time. The reward for an account is
//!
//! `reward = Σ(amount_i × days_i) × rate / (365 × 10^precision)`
//!
//! where `days_i` is the entry's whole-day age since it was last rewarded,
//! zero below the minimum age and capped at the maximum age.
//!
//! This crate handles:
//! - The per-account stake ledger (add, sum, clear, roll over)
//! - The pure coin-age and reward computation
//! - The stake / unstake / reward state transitions against a balance ledger
//! - Owner-gated one-time initialization and per-account re-entrancy guarding

pub mod contract;
pub mod engine;
pub mod entry;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod snapshot;

pub use contract::{AccountStatus, StakingContract};
pub use engine::RewardEngine;
pub use entry::StakeEntry;
pub use error::StakingError;
pub use guard::{AccountGuard, ReentrancyGuard};
pub use ledger::StakeLedger;
pub use snapshot::{ContractSnapshot, StakeListSnapshot};
