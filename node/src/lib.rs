//! Staking node: configuration, logging and persisted state around the
//! coin-age staking contract.
//!
//! The node is the layer the command-line front end talks to:
//! - Loads TOML configuration
//! - Initialises structured logging
//! - Restores the contract and balance ledger from the state file
//! - Saves them back after every state-changing command

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod state;

pub use config::{NodeConfig, StakingConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::StakingNode;
pub use state::{NodeState, StateFile, STATE_FILE_NAME};
