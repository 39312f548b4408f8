use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("staking error: {0}")]
    Staking(#[from] coinage_staking::StakingError),

    #[error("ledger error: {0}")]
    Ledger(#[from] coinage_ledger::LedgerError),

    #[error("invalid value: {0}")]
    Types(#[from] coinage_types::TypesError),

    #[error("config error: {0}")]
    Config(String),

    #[error("state file error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
