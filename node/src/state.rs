//! The on-disk state file.
//!
//! The whole staking state (contract snapshot plus ledger snapshot) is one
//! bincode blob in `<data_dir>/state.bin`. Saves go through a temporary file
//! and a rename, so a crash mid-write leaves the previous state intact.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use coinage_ledger::{LedgerSnapshot, SupplyLedger};
use coinage_staking::{ContractSnapshot, StakingContract};
use coinage_types::Timestamp;

use crate::NodeError;

pub const STATE_FILE_NAME: &str = "state.bin";

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeState {
    pub version: u32,
    pub saved_at: Timestamp,
    pub contract: ContractSnapshot,
    pub ledger: LedgerSnapshot,
}

impl NodeState {
    pub fn capture(contract: &StakingContract<SupplyLedger>, now: Timestamp) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: now,
            contract: contract.snapshot(),
            ledger: contract.balance_ledger().snapshot(now),
        }
    }

    /// Rebuild the ledger and contract, checking integrity on the way.
    pub fn restore(&self) -> Result<StakingContract<SupplyLedger>, NodeError> {
        if self.version != STATE_VERSION {
            return Err(NodeError::State(format!(
                "unsupported state version {} (expected {})",
                self.version, STATE_VERSION
            )));
        }
        let ledger = SupplyLedger::from_snapshot(&self.ledger)?;
        Ok(StakingContract::from_snapshot(&self.contract, Arc::new(ledger))?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, NodeError> {
        bincode::serialize(self).map_err(|e| NodeError::State(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NodeError> {
        bincode::deserialize(bytes).map_err(|e| NodeError::State(e.to_string()))
    }
}

pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STATE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// `Ok(None)` when no state has been saved yet.
    pub fn load(&self) -> Result<Option<NodeState>, NodeError> {
        if !self.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)?;
        let state = NodeState::from_bytes(&bytes)?;
        debug!(
            path = %self.path.display(),
            saved_at = %state.saved_at,
            ledger_hash = %hex::encode(state.ledger.hash),
            "state loaded"
        );
        Ok(Some(state))
    }

    pub fn save(&self, state: &NodeState) -> Result<(), NodeError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("bin.tmp");
        std::fs::write(&tmp, state.to_bytes()?)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(
            path = %self.path.display(),
            saved_at = %state.saved_at,
            ledger_hash = %hex::encode(state.ledger.hash),
            "state saved"
        );
        Ok(())
    }
}
