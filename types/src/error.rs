//! Errors raised while constructing core types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account address: {0}")]
    InvalidAddress(String),

    #[error("invalid staking parameters: {0}")]
    InvalidParams(String),

    #[error("system clock is {0}s before the Unix epoch")]
    ClockBeforeEpoch(u64),
}
