use coinage_types::TokenAmount;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance in {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: String,
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("total supply {attempted} would exceed ceiling {ceiling}")]
    SupplyCeilingViolation {
        attempted: TokenAmount,
        ceiling: TokenAmount,
    },

    #[error("total supply {attempted} would drop below floor {floor}")]
    SupplyFloorViolation {
        attempted: TokenAmount,
        floor: TokenAmount,
    },

    #[error("arithmetic overflow in ledger update")]
    Overflow,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
