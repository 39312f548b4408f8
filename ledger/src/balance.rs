//! Balance ledger trait and the in-memory bounded-supply implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use coinage_types::{AccountAddress, SupplyBounds, Timestamp, TokenAmount};
use tracing::debug;

use crate::error::LedgerError;
use crate::snapshot::{BalanceEntry, LedgerSnapshot};

/// The two balance primitives the staking engine consumes, plus reads.
///
/// `mint` and `burn` must check the bound and apply the update as one atomic
/// step, so that concurrent callers can never jointly push the total supply
/// outside `bounds`.
pub trait BalanceLedger: Send + Sync {
    /// Spendable balance of `account`; zero for unknown accounts.
    fn balance_of(&self, account: &AccountAddress) -> TokenAmount;

    /// Total outstanding supply across all accounts.
    fn total_supply(&self) -> TokenAmount;

    /// Credit `account`, failing if supply would exceed `bounds.max_total_supply`.
    fn mint(
        &self,
        account: &AccountAddress,
        amount: TokenAmount,
        bounds: &SupplyBounds,
    ) -> Result<(), LedgerError>;

    /// Debit `account`, failing if supply would drop below `bounds.min_total_supply`.
    fn burn(
        &self,
        account: &AccountAddress,
        amount: TokenAmount,
        bounds: &SupplyBounds,
    ) -> Result<(), LedgerError>;
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<AccountAddress, TokenAmount>,
    total_supply: TokenAmount,
}

impl LedgerState {
    fn balance(&self, account: &AccountAddress) -> TokenAmount {
        self.balances.get(account).copied().unwrap_or(TokenAmount::ZERO)
    }

    fn set_balance(&mut self, account: &AccountAddress, balance: TokenAmount) {
        if balance.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), balance);
        }
    }
}

/// In-memory balance ledger.
///
/// Balances and the supply counter sit behind one lock, which makes every
/// bound check and the update it guards a single critical section.
#[derive(Default)]
pub struct SupplyLedger {
    state: Mutex<LedgerState>,
}

impl SupplyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move `amount` between accounts. Total supply is unchanged.
    pub fn transfer(
        &self,
        from: &AccountAddress,
        to: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let available = state.balance(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: from.to_string(),
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = state
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        state.set_balance(from, remaining);
        state.set_balance(to, credited);
        debug!(from = %from, to = %to, amount = %amount, "transfer");
        Ok(())
    }

    /// Number of accounts holding a non-zero balance.
    pub fn account_count(&self) -> usize {
        self.lock().balances.len()
    }

    /// Capture all balances, sorted by address so the hash is deterministic.
    pub fn snapshot(&self, created_at: Timestamp) -> LedgerSnapshot {
        let state = self.lock();
        let mut balances: Vec<BalanceEntry> = state
            .balances
            .iter()
            .map(|(address, balance)| BalanceEntry {
                address: address.clone(),
                balance: *balance,
            })
            .collect();
        balances.sort_by(|a, b| a.address.cmp(&b.address));
        LedgerSnapshot::create(balances, state.total_supply, created_at)
    }

    /// Rebuild a ledger from a snapshot after checking its integrity.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        if !snapshot.verify() {
            return Err(LedgerError::Snapshot("hash mismatch".to_string()));
        }
        let mut state = LedgerState::default();
        let mut sum = TokenAmount::ZERO;
        for entry in &snapshot.balances {
            sum = sum.checked_add(entry.balance).ok_or(LedgerError::Overflow)?;
            state.set_balance(&entry.address, entry.balance);
        }
        if sum != snapshot.total_supply {
            return Err(LedgerError::Snapshot(format!(
                "balances sum to {} but total supply is {}",
                sum, snapshot.total_supply
            )));
        }
        state.total_supply = snapshot.total_supply;
        Ok(Self {
            state: Mutex::new(state),
        })
    }
}

impl BalanceLedger for SupplyLedger {
    fn balance_of(&self, account: &AccountAddress) -> TokenAmount {
        self.lock().balance(account)
    }

    fn total_supply(&self) -> TokenAmount {
        self.lock().total_supply
    }

    fn mint(
        &self,
        account: &AccountAddress,
        amount: TokenAmount,
        bounds: &SupplyBounds,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let attempted = state
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if attempted > bounds.max_total_supply {
            return Err(LedgerError::SupplyCeilingViolation {
                attempted,
                ceiling: bounds.max_total_supply,
            });
        }
        let credited = state
            .balance(account)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        state.set_balance(account, credited);
        state.total_supply = attempted;
        debug!(account = %account, amount = %amount, supply = %attempted, "mint");
        Ok(())
    }

    fn burn(
        &self,
        account: &AccountAddress,
        amount: TokenAmount,
        bounds: &SupplyBounds,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock();
        let available = state.balance(account);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: account.to_string(),
                needed: amount,
                available,
            })?;
        let attempted = state
            .total_supply
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow)?;
        if attempted < bounds.min_total_supply {
            return Err(LedgerError::SupplyFloorViolation {
                attempted,
                floor: bounds.min_total_supply,
            });
        }
        state.set_balance(account, remaining);
        state.total_supply = attempted;
        debug!(account = %account, amount = %amount, supply = %attempted, "burn");
        Ok(())
    }
}
