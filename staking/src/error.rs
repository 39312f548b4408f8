//! Staking errors.
//!
//! Every failure is synchronous and leaves no state change behind.

use coinage_ledger::LedgerError;
use coinage_types::{Timestamp, TokenAmount, TypesError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("account {0} has no staked funds")]
    NoStakedFunds(String),

    #[error("rewards not started: now {now}, stake start time {start}")]
    RewardsNotStarted { now: Timestamp, start: Timestamp },

    #[error("total supply {attempted} would drop below floor {floor}")]
    SupplyFloorViolation {
        attempted: TokenAmount,
        floor: TokenAmount,
    },

    #[error("total supply {attempted} would exceed ceiling {ceiling}")]
    SupplyCeilingViolation {
        attempted: TokenAmount,
        ceiling: TokenAmount,
    },

    #[error("staking is already initialized")]
    AlreadyInitialized,

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error("staking has not been initialized")]
    NotInitialized,

    #[error("stake of {amount} is below the minimum of {minimum}")]
    StakeBelowMinimum {
        amount: TokenAmount,
        minimum: TokenAmount,
    },

    #[error("another operation for {0} is still in progress")]
    OperationInProgress(String),

    #[error("invalid staking parameters: {0}")]
    InvalidParams(String),

    #[error("arithmetic overflow in coin-age computation")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<LedgerError> for StakingError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                needed, available, ..
            } => Self::InsufficientBalance { needed, available },
            LedgerError::SupplyCeilingViolation { attempted, ceiling } => {
                Self::SupplyCeilingViolation { attempted, ceiling }
            }
            LedgerError::SupplyFloorViolation { attempted, floor } => {
                Self::SupplyFloorViolation { attempted, floor }
            }
            LedgerError::Overflow => Self::Overflow,
            LedgerError::Snapshot(msg) => Self::Snapshot(msg),
        }
    }
}

impl From<TypesError> for StakingError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidParams(msg) => Self::InvalidParams(msg),
            other => Self::InvalidParams(other.to_string()),
        }
    }
}
