//! The staking node: configuration, persisted state and the contract.

use std::sync::Arc;

use tracing::{info, warn};

use coinage_ledger::SupplyLedger;
use coinage_staking::StakingContract;
use coinage_types::{AccountAddress, StakingParams, Timestamp};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::state::{NodeState, StateFile};

/// Owns one staking contract and the file it is persisted in.
///
/// Each command opens the node, runs against the contract and, if it changed
/// anything, saves before exiting.
pub struct StakingNode {
    config: NodeConfig,
    state_file: StateFile,
    contract: StakingContract<SupplyLedger>,
}

impl StakingNode {
    /// Load the saved state, or start empty when there is none yet.
    ///
    /// A fresh node needs `owner` in its configuration; a restored one takes
    /// its owner from the state file.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        let state_file = StateFile::in_dir(&config.data_dir);
        let contract = match state_file.load()? {
            Some(state) => {
                let contract = state.restore()?;
                if let Some(configured) = config.owner()? {
                    if &configured != contract.owner() {
                        warn!(
                            configured = %configured,
                            recorded = %contract.owner(),
                            "configured owner differs from saved state; using saved owner"
                        );
                    }
                }
                contract
            }
            None => {
                let owner = config.owner()?.ok_or_else(|| {
                    NodeError::Config("no saved state and no owner configured".to_string())
                })?;
                info!(owner = %owner, path = %state_file.path().display(), "starting with empty state");
                StakingContract::new(owner, Arc::new(SupplyLedger::new()))
            }
        };
        Ok(Self {
            config,
            state_file,
            contract,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn contract(&self) -> &StakingContract<SupplyLedger> {
        &self.contract
    }

    pub fn ledger(&self) -> &SupplyLedger {
        self.contract.balance_ledger()
    }

    pub fn state_file(&self) -> &StateFile {
        &self.state_file
    }

    /// Initialize staking with the `[staking]` parameters from the config.
    pub fn initialize(
        &self,
        caller: &AccountAddress,
        now: Timestamp,
    ) -> Result<Arc<StakingParams>, NodeError> {
        let init = self.config.staking.to_init_params()?;
        Ok(self.contract.initialize(caller, &init, now)?)
    }

    pub fn save(&self, now: Timestamp) -> Result<(), NodeError> {
        self.state_file.save(&NodeState::capture(&self.contract, now))
    }
}
