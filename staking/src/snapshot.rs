//! Contract snapshots: owner, parameters and every open stake list.

use serde::{Deserialize, Serialize};

use coinage_types::{AccountAddress, StakingParams};

use crate::entry::StakeEntry;
use crate::error::StakingError;

/// One account's stake list inside a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeListSnapshot {
    pub account: AccountAddress,
    pub entries: Vec<StakeEntry>,
}

/// Everything needed to rebuild a [`crate::StakingContract`] apart from
/// the balance ledger, which snapshots itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSnapshot {
    pub owner: AccountAddress,
    /// `None` until the contract has been initialized.
    pub params: Option<StakingParams>,
    /// Sorted by account.
    pub stakes: Vec<StakeListSnapshot>,
}

impl ContractSnapshot {
    /// Reject stake lists that no sequence of operations could have produced.
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.params.is_none() && !self.stakes.is_empty() {
            return Err(StakingError::Snapshot(
                "stake entries present before initialization".to_string(),
            ));
        }
        for list in &self.stakes {
            if list.entries.is_empty() {
                return Err(StakingError::Snapshot(format!(
                    "empty stake list for {}",
                    list.account
                )));
            }
            if let Some(bad) = list
                .entries
                .iter()
                .find(|e| e.rewarded_until() < e.start_time())
            {
                return Err(StakingError::Snapshot(format!(
                    "entry for {} rewarded until {} before its start {}",
                    list.account,
                    bad.rewarded_until(),
                    bad.start_time()
                )));
            }
            if list
                .entries
                .windows(2)
                .any(|w| w[1].start_time() < w[0].start_time())
            {
                return Err(StakingError::Snapshot(format!(
                    "entry start times for {} go backwards",
                    list.account
                )));
            }
        }
        if self.stakes.windows(2).any(|w| w[0].account >= w[1].account) {
            return Err(StakingError::Snapshot(
                "stake lists are not sorted by account".to_string(),
            ));
        }
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.stakes.iter().map(|s| s.entries.len()).sum()
    }
}
