//! Per-account re-entrancy guard.
//!
//! A state-changing operation holds its account's guard for its whole
//! duration. A second operation on the same account, whether nested or from
//! another thread, is rejected instead of interleaving with the first.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use coinage_types::AccountAddress;

use crate::error::StakingError;

#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    active: Mutex<HashSet<AccountAddress>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `account` busy until the returned guard drops.
    pub fn enter(&self, account: &AccountAddress) -> Result<AccountGuard<'_>, StakingError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(account.clone()) {
            return Err(StakingError::OperationInProgress(account.to_string()));
        }
        Ok(AccountGuard {
            owner: self,
            account: account.clone(),
        })
    }

    pub fn is_active(&self, account: &AccountAddress) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(account)
    }
}

/// Releases its account on drop, including on early return or panic.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    owner: &'a ReentrancyGuard,
    account: AccountAddress,
}

impl AccountGuard<'_> {
    pub fn account(&self) -> &AccountAddress {
        &self.account
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.account);
    }
}
