//! The staking contract: stake, unstake and reward against a balance ledger.
//!
//! Every state transition follows the same shape: take the account's
//! re-entrancy guard, validate everything that can fail, then perform the
//! single fallible ledger call, and only after it succeeds touch the stake
//! ledger. A failed call therefore leaves both ledgers exactly as it found
//! them.

use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use coinage_ledger::BalanceLedger;
use coinage_types::{AccountAddress, InitParams, StakingParams, Timestamp, TokenAmount, U256};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::engine::RewardEngine;
use crate::entry::StakeEntry;
use crate::error::StakingError;
use crate::guard::ReentrancyGuard;
use crate::ledger::StakeLedger;
use crate::snapshot::{ContractSnapshot, StakeListSnapshot};

/// Serialize a number as its decimal string, keeping 256-bit values exact in JSON.
fn as_decimal<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Read-only view of one account at one instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountStatus {
    pub account: AccountAddress,
    pub now: Timestamp,
    #[serde(serialize_with = "as_decimal")]
    pub balance: TokenAmount,
    #[serde(serialize_with = "as_decimal")]
    pub staked: TokenAmount,
    pub entries: usize,
    #[serde(serialize_with = "as_decimal")]
    pub coin_age: U256,
    #[serde(serialize_with = "as_decimal")]
    pub pending_reward: TokenAmount,
}

/// Coin-age staking on top of a [`BalanceLedger`].
pub struct StakingContract<L: BalanceLedger> {
    owner: AccountAddress,
    ledger: Arc<L>,
    params: RwLock<Option<Arc<StakingParams>>>,
    stakes: Mutex<StakeLedger>,
    guard: ReentrancyGuard,
}

impl<L: BalanceLedger> StakingContract<L> {
    /// An uninitialized contract. Only `owner` may call [`Self::initialize`].
    pub fn new(owner: AccountAddress, ledger: Arc<L>) -> Self {
        Self {
            owner,
            ledger,
            params: RwLock::new(None),
            stakes: Mutex::new(StakeLedger::new()),
            guard: ReentrancyGuard::new(),
        }
    }

    /// Rebuild a contract from a snapshot over an already-restored ledger.
    pub fn from_snapshot(snapshot: &ContractSnapshot, ledger: Arc<L>) -> Result<Self, StakingError> {
        snapshot.validate()?;
        let mut stakes = StakeLedger::new();
        for list in &snapshot.stakes {
            stakes.restore(list.account.clone(), list.entries.clone());
        }
        Ok(Self {
            owner: snapshot.owner.clone(),
            ledger,
            params: RwLock::new(snapshot.params.clone().map(Arc::new)),
            stakes: Mutex::new(stakes),
            guard: ReentrancyGuard::new(),
        })
    }

    fn stakes(&self) -> MutexGuard<'_, StakeLedger> {
        self.stakes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn owner(&self) -> &AccountAddress {
        &self.owner
    }

    pub fn balance_ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn is_initialized(&self) -> bool {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn params(&self) -> Result<Arc<StakingParams>, StakingError> {
        self.params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StakingError::NotInitialized)
    }

    pub fn engine(&self) -> Result<RewardEngine, StakingError> {
        Ok(RewardEngine::new(self.params()?))
    }

    /// One-time setup by the owner.
    ///
    /// Mints `min_total_supply` to the owner and starts the reward clock at
    /// `now`. The write lock is held throughout, so two racing calls cannot
    /// both succeed.
    pub fn initialize(
        &self,
        caller: &AccountAddress,
        init: &InitParams,
        now: Timestamp,
    ) -> Result<Arc<StakingParams>, StakingError> {
        let result = self.initialize_once(caller, init, now);
        match &result {
            Ok(params) => info!(
                owner = %self.owner,
                minted = %init.min_total_supply,
                max_supply = %params.bounds.max_total_supply,
                start = %params.stake_start_time,
                "staking initialized"
            ),
            Err(e) => warn!(caller = %caller, error = %e, "initialize rejected"),
        }
        result
    }

    fn initialize_once(
        &self,
        caller: &AccountAddress,
        init: &InitParams,
        now: Timestamp,
    ) -> Result<Arc<StakingParams>, StakingError> {
        if caller != &self.owner {
            return Err(StakingError::Unauthorized(caller.to_string()));
        }
        let mut slot = self.params.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(StakingError::AlreadyInitialized);
        }
        let params = Arc::new(StakingParams::from_init(init, now)?);
        self.ledger
            .mint(&self.owner, init.min_total_supply, &params.bounds)?;
        *slot = Some(Arc::clone(&params));
        Ok(params)
    }

    /// Owner-only issuance of new balance to `to`, within the supply ceiling.
    ///
    /// Rejected with `OperationInProgress` while `to` is mid-operation.
    pub fn issue(
        &self,
        caller: &AccountAddress,
        to: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<TokenAmount, StakingError> {
        let result = self.issue_inner(caller, to, amount);
        log_outcome("issue", to, &result);
        result
    }

    fn issue_inner(
        &self,
        caller: &AccountAddress,
        to: &AccountAddress,
        amount: TokenAmount,
    ) -> Result<TokenAmount, StakingError> {
        if caller != &self.owner {
            return Err(StakingError::Unauthorized(caller.to_string()));
        }
        let _guard = self.guard.enter(to)?;
        let params = self.params()?;
        self.ledger.mint(to, amount, &params.bounds)?;
        Ok(amount)
    }

    /// Lock `amount` of `account`'s balance in a new stake entry stamped `now`.
    pub fn stake(
        &self,
        account: &AccountAddress,
        amount: TokenAmount,
        now: Timestamp,
    ) -> Result<TokenAmount, StakingError> {
        let result = self.guard.enter(account).and_then(|_guard| {
            let params = self.params()?;
            self.stake_entered(&params, account, amount, now)
        });
        log_outcome("stake", account, &result);
        result
    }

    /// Stake the account's entire available balance.
    pub fn stake_all(
        &self,
        account: &AccountAddress,
        now: Timestamp,
    ) -> Result<TokenAmount, StakingError> {
        let result = self.guard.enter(account).and_then(|_guard| {
            let params = self.params()?;
            let amount = self.ledger.balance_of(account);
            self.stake_entered(&params, account, amount, now)
        });
        log_outcome("stake_all", account, &result);
        result
    }

    fn stake_entered(
        &self,
        params: &StakingParams,
        account: &AccountAddress,
        amount: TokenAmount,
        now: Timestamp,
    ) -> Result<TokenAmount, StakingError> {
        if amount < params.stake_min_amount {
            return Err(StakingError::StakeBelowMinimum {
                amount,
                minimum: params.stake_min_amount,
            });
        }
        let available = self.ledger.balance_of(account);
        if available < amount {
            return Err(StakingError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.ledger.burn(account, amount, &params.bounds)?;
        let stamped = self.stakes().add_entry(account, amount, now);
        if stamped != now {
            debug!(account = %account, requested = %now, stamped = %stamped, "stake time moved forward");
        }
        Ok(amount)
    }

    /// Withdraw every open entry back to the account's balance.
    pub fn unstake_all(&self, account: &AccountAddress) -> Result<TokenAmount, StakingError> {
        let result = self.guard.enter(account).and_then(|_guard| {
            let params = self.params()?;
            let total = {
                let stakes = self.stakes();
                if !stakes.has_entries(account) {
                    return Err(StakingError::NoStakedFunds(account.to_string()));
                }
                stakes.total_amount(account)
            };
            self.ledger.mint(account, total, &params.bounds)?;
            Ok(self.stakes().clear_all(account))
        });
        log_outcome("unstake_all", account, &result);
        result
    }

    /// Mint the accrued reward and roll the stake over.
    ///
    /// Entries keep their principal. Each entry's reward watermark moves past
    /// the whole days just paid, so a repeat call at the same instant pays
    /// nothing. A zero reward leaves the watermarks alone so sub-unit
    /// coin-age keeps accumulating.
    pub fn reward(&self, account: &AccountAddress, now: Timestamp) -> Result<TokenAmount, StakingError> {
        let result = self.guard.enter(account).and_then(|_guard| {
            let params = self.params()?;
            let entries = {
                let stakes = self.stakes();
                if !stakes.has_entries(account) {
                    return Err(StakingError::NoStakedFunds(account.to_string()));
                }
                stakes.entries(account).to_vec()
            };
            if params.stake_start_time.is_epoch() || now < params.stake_start_time {
                return Err(StakingError::RewardsNotStarted {
                    now,
                    start: params.stake_start_time,
                });
            }
            let accrual = RewardEngine::new(Arc::clone(&params)).accrue(&entries, now)?;
            if accrual.reward.is_zero() {
                return Ok(TokenAmount::ZERO);
            }
            self.ledger.mint(account, accrual.reward, &params.bounds)?;
            self.stakes().roll_over(account, &accrual.watermarks);
            Ok(accrual.reward)
        });
        log_outcome("reward", account, &result);
        result
    }

    /// Sum of the account's open stakes.
    pub fn stake_of(&self, account: &AccountAddress) -> TokenAmount {
        self.stakes().total_amount(account)
    }

    pub fn entries_of(&self, account: &AccountAddress) -> Vec<StakeEntry> {
        self.stakes().entries(account).to_vec()
    }

    pub fn coin_age_of(&self, account: &AccountAddress, now: Timestamp) -> Result<U256, StakingError> {
        let engine = self.engine()?;
        let stakes = self.stakes();
        engine.coin_age(stakes.entries(account), now)
    }

    /// What [`Self::reward`] would mint at `now`, without minting it.
    pub fn pending_reward(
        &self,
        account: &AccountAddress,
        now: Timestamp,
    ) -> Result<TokenAmount, StakingError> {
        let engine = self.engine()?;
        let stakes = self.stakes();
        engine.proof_of_stake_reward(stakes.entries(account), now)
    }

    pub fn annual_interest(&self) -> Result<U256, StakingError> {
        Ok(self.engine()?.annual_interest())
    }

    pub fn status(&self, account: &AccountAddress, now: Timestamp) -> Result<AccountStatus, StakingError> {
        let engine = self.engine()?;
        let entries = self.entries_of(account);
        let coin_age = engine.coin_age(&entries, now)?;
        Ok(AccountStatus {
            account: account.clone(),
            now,
            balance: self.ledger.balance_of(account),
            staked: entries
                .iter()
                .fold(TokenAmount::ZERO, |acc, e| acc.saturating_add(e.amount())),
            entries: entries.len(),
            coin_age,
            pending_reward: engine.reward_for_coin_age(coin_age)?,
        })
    }

    /// Number of accounts with open stakes.
    pub fn staker_count(&self) -> usize {
        self.stakes().account_count()
    }

    pub fn snapshot(&self) -> ContractSnapshot {
        let params = self
            .params
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            .cloned();
        let mut stakes: Vec<StakeListSnapshot> = self
            .stakes()
            .iter()
            .map(|(account, entries)| StakeListSnapshot {
                account: account.clone(),
                entries: entries.to_vec(),
            })
            .collect();
        stakes.sort_by(|a, b| a.account.cmp(&b.account));
        ContractSnapshot {
            owner: self.owner.clone(),
            params,
            stakes,
        }
    }
}

fn log_outcome(op: &'static str, account: &AccountAddress, result: &Result<TokenAmount, StakingError>) {
    match result {
        Ok(amount) => info!(op, account = %account, amount = %amount, "staking operation applied"),
        Err(e) => warn!(op, account = %account, error = %e, "staking operation rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinage_ledger::SupplyLedger;
    use coinage_types::time::SECONDS_PER_DAY;
    use coinage_types::TOKEN_UNIT;

    const DAY: u64 = SECONDS_PER_DAY;
    const T0: u64 = 1_000;

    fn addr(name: &str) -> AccountAddress {
        AccountAddress::parse(format!("cg_{name}")).unwrap()
    }

    fn tokens(n: u128) -> TokenAmount {
        TokenAmount::from_tokens(n).unwrap()
    }

    fn init(min_supply: u128, max_supply: u128, min_age_days: u64, max_age_days: u64) -> InitParams {
        InitParams {
            min_total_supply: tokens(min_supply),
            max_total_supply: tokens(max_supply),
            stake_min_age: min_age_days * DAY,
            stake_max_age: max_age_days * DAY,
            stake_precision: 18,
        }
    }

    fn contract_with(params: InitParams) -> StakingContract<SupplyLedger> {
        let contract = StakingContract::new(addr("owner"), Arc::new(SupplyLedger::new()));
        contract
            .initialize(&addr("owner"), &params, Timestamp::new(T0))
            .unwrap();
        contract
    }

    /// No supply floor, a generous ceiling, no minimum age, one-year cap.
    fn contract() -> StakingContract<SupplyLedger> {
        contract_with(init(0, 1_000_000, 0, 365))
    }

    fn fund(c: &StakingContract<SupplyLedger>, account: &AccountAddress, amount: TokenAmount) {
        let bounds = c.params().unwrap().bounds;
        c.balance_ledger().mint(account, amount, &bounds).unwrap();
    }

    fn at(days: u64) -> Timestamp {
        Timestamp::new(T0 + days * DAY)
    }

    #[test]
    fn initialize_mints_floor_to_owner() {
        let c = contract_with(init(10_000, 1_000_000, 0, 365));
        assert_eq!(c.balance_ledger().balance_of(&addr("owner")), tokens(10_000));
        assert_eq!(c.balance_ledger().total_supply(), tokens(10_000));
        let params = c.params().unwrap();
        assert_eq!(params.stake_start_time, Timestamp::new(T0));
        assert_eq!(params.stake_min_amount, TOKEN_UNIT);
        assert_eq!(c.annual_interest().unwrap(), U256::exp10(17));
    }

    #[test]
    fn initialize_twice_fails() {
        let c = contract_with(init(10_000, 1_000_000, 0, 365));
        assert_eq!(
            c.initialize(&addr("owner"), &init(1, 2, 0, 1), at(1)).unwrap_err(),
            StakingError::AlreadyInitialized
        );
        assert_eq!(c.balance_ledger().total_supply(), tokens(10_000));
        assert_eq!(c.params().unwrap().stake_start_time, Timestamp::new(T0));
    }

    #[test]
    fn initialize_by_non_owner_fails() {
        let c = StakingContract::new(addr("owner"), Arc::new(SupplyLedger::new()));
        assert_eq!(
            c.initialize(&addr("mallory"), &init(1, 2, 0, 1), Timestamp::new(T0))
                .unwrap_err(),
            StakingError::Unauthorized(addr("mallory").to_string())
        );
        assert!(!c.is_initialized());
    }

    #[test]
    fn invalid_params_leave_contract_uninitialized() {
        let c = StakingContract::new(addr("owner"), Arc::new(SupplyLedger::new()));
        let err = c
            .initialize(&addr("owner"), &init(5, 1, 0, 1), Timestamp::new(T0))
            .unwrap_err();
        assert!(matches!(err, StakingError::InvalidParams(_)));
        assert!(!c.is_initialized());
        assert_eq!(c.balance_ledger().total_supply(), TokenAmount::ZERO);
    }

    #[test]
    fn operations_before_initialize_fail() {
        let c = StakingContract::new(addr("owner"), Arc::new(SupplyLedger::new()));
        let a = addr("owner");
        assert_eq!(c.stake(&a, tokens(1), at(0)).unwrap_err(), StakingError::NotInitialized);
        assert_eq!(c.unstake_all(&a).unwrap_err(), StakingError::NotInitialized);
        assert_eq!(c.reward(&a, at(0)).unwrap_err(), StakingError::NotInitialized);
        assert_eq!(c.pending_reward(&a, at(0)).unwrap_err(), StakingError::NotInitialized);
        assert_eq!(c.stake_of(&a), TokenAmount::ZERO);
    }

    #[test]
    fn stake_moves_balance_into_entries() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(10_000));
        c.stake(&o, tokens(100), at(0)).unwrap();
        c.stake(&o, tokens(50), at(1)).unwrap();
        assert_eq!(c.stake_of(&o), tokens(150));
        assert_eq!(c.entries_of(&o).len(), 2);
        assert_eq!(c.balance_ledger().balance_of(&o), tokens(9_850));
        assert_eq!(c.balance_ledger().total_supply(), tokens(9_850));
    }

    #[test]
    fn stake_more_than_balance_fails() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(10_000));
        let err = c.stake(&o, tokens(10_001), at(0)).unwrap_err();
        assert_eq!(
            err,
            StakingError::InsufficientBalance {
                needed: tokens(10_001),
                available: tokens(10_000),
            }
        );
        assert_eq!(c.stake_of(&o), TokenAmount::ZERO);
        assert_eq!(c.balance_ledger().balance_of(&o), tokens(10_000));
    }

    #[test]
    fn stake_below_minimum_fails() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(1));
        let err = c.stake(&o, TokenAmount::from(999u128), at(0)).unwrap_err();
        assert_eq!(
            err,
            StakingError::StakeBelowMinimum {
                amount: TokenAmount::from(999u128),
                minimum: TOKEN_UNIT,
            }
        );
    }

    #[test]
    fn stake_below_supply_floor_fails_without_change() {
        let c = contract_with(init(10_000, 1_000_000, 0, 365));
        // The whole supply sits at the floor, so any burn would cross it.
        let err = c.stake(&addr("owner"), tokens(1), at(0)).unwrap_err();
        assert!(matches!(err, StakingError::SupplyFloorViolation { .. }));
        assert_eq!(c.stake_of(&addr("owner")), TokenAmount::ZERO);
        assert_eq!(c.balance_ledger().balance_of(&addr("owner")), tokens(10_000));
    }

    #[test]
    fn unstake_returns_everything() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(500));
        c.stake(&o, tokens(200), at(0)).unwrap();
        c.stake(&o, tokens(300), at(2)).unwrap();
        assert_eq!(c.unstake_all(&o).unwrap(), tokens(500));
        assert_eq!(c.stake_of(&o), TokenAmount::ZERO);
        assert!(c.entries_of(&o).is_empty());
        assert_eq!(c.balance_ledger().balance_of(&o), tokens(500));
    }

    #[test]
    fn unstake_without_entries_fails_and_keeps_balance() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(10));
        assert_eq!(
            c.unstake_all(&o).unwrap_err(),
            StakingError::NoStakedFunds(o.to_string())
        );
        assert_eq!(c.balance_ledger().balance_of(&o), tokens(10));
    }

    #[test]
    fn reward_without_entries_fails() {
        let c = contract();
        assert!(matches!(
            c.reward(&addr("owner"), at(30)).unwrap_err(),
            StakingError::NoStakedFunds(_)
        ));
    }

    #[test]
    fn reward_before_start_time_fails() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(10));
        c.stake(&o, tokens(10), at(0)).unwrap();
        let err = c.reward(&o, Timestamp::new(T0 - 1)).unwrap_err();
        assert_eq!(
            err,
            StakingError::RewardsNotStarted {
                now: Timestamp::new(T0 - 1),
                start: Timestamp::new(T0),
            }
        );
    }

    #[test]
    fn reward_with_unset_start_time_fails() {
        let c = StakingContract::new(addr("owner"), Arc::new(SupplyLedger::new()));
        c.initialize(&addr("owner"), &init(0, 1_000_000, 0, 365), Timestamp::EPOCH)
            .unwrap();
        let o = addr("owner");
        fund(&c, &o, tokens(10));
        c.stake(&o, tokens(10), Timestamp::EPOCH).unwrap();
        assert!(matches!(
            c.reward(&o, Timestamp::new(30 * DAY)).unwrap_err(),
            StakingError::RewardsNotStarted { .. }
        ));
    }

    #[test]
    fn thirty_day_reward_on_thousand_tokens() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(1_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        let expected = TokenAmount::from(8_219_178_082_191_780_821u128);
        assert_eq!(c.pending_reward(&o, at(30)).unwrap(), expected);
        assert_eq!(c.reward(&o, at(30)).unwrap(), expected);
        assert_eq!(c.balance_ledger().balance_of(&o), expected);
        assert_eq!(c.stake_of(&o), tokens(1_000));
    }

    #[test]
    fn second_immediate_reward_is_zero() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(1_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        assert!(!c.reward(&o, at(30)).unwrap().is_zero());
        let balance = c.balance_ledger().balance_of(&o);
        assert_eq!(c.reward(&o, at(30)).unwrap(), TokenAmount::ZERO);
        assert_eq!(c.balance_ledger().balance_of(&o), balance);
        assert_eq!(c.coin_age_of(&o, at(30)).unwrap(), U256::zero());
    }

    #[test]
    fn rolled_over_stake_keeps_accruing() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(1_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        let first = c.reward(&o, at(30)).unwrap();
        let second = c.reward(&o, at(60)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn min_age_is_measured_from_original_start() {
        let c = contract_with(init(0, 1_000_000, 3, 90));
        let o = addr("owner");
        fund(&c, &o, tokens(1_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        assert_eq!(c.pending_reward(&o, at(2)).unwrap(), TokenAmount::ZERO);
        c.reward(&o, at(10)).unwrap();
        // One day later the entry is still past its minimum age.
        assert_eq!(c.coin_age_of(&o, at(11)).unwrap(), tokens(1_000).raw());
    }

    #[test]
    fn reward_above_ceiling_fails_without_rolling_over() {
        let c = contract_with(init(0, 1_000, 0, 365));
        let o = addr("owner");
        fund(&c, &o, tokens(1_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        // Refill to the ceiling so the reward cannot be minted.
        fund(&c, &addr("other"), tokens(1_000));
        let err = c.reward(&o, at(30)).unwrap_err();
        assert!(matches!(err, StakingError::SupplyCeilingViolation { .. }));
        assert_eq!(c.entries_of(&o)[0].rewarded_until(), at(0));
        assert_eq!(c.balance_ledger().total_supply(), tokens(1_000));
    }

    #[test]
    fn unstake_above_ceiling_keeps_entries() {
        let c = contract_with(init(0, 1_000, 0, 365));
        let o = addr("owner");
        fund(&c, &o, tokens(500));
        c.stake(&o, tokens(500), at(0)).unwrap();
        fund(&c, &addr("other"), tokens(600));
        let err = c.unstake_all(&o).unwrap_err();
        assert!(matches!(err, StakingError::SupplyCeilingViolation { .. }));
        assert_eq!(c.stake_of(&o), tokens(500));
        assert_eq!(c.balance_ledger().balance_of(&o), TokenAmount::ZERO);
    }

    #[test]
    fn stake_all_uses_whole_balance() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(42));
        assert_eq!(c.stake_all(&o, at(0)).unwrap(), tokens(42));
        assert_eq!(c.balance_ledger().balance_of(&o), TokenAmount::ZERO);
        assert!(matches!(
            c.stake_all(&o, at(1)).unwrap_err(),
            StakingError::StakeBelowMinimum { .. }
        ));
    }

    #[test]
    fn busy_account_is_rejected() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(5));
        let held = c.guard.enter(&o).unwrap();
        assert_eq!(
            c.stake(&o, tokens(1), at(0)).unwrap_err(),
            StakingError::OperationInProgress(o.to_string())
        );
        assert_eq!(
            c.unstake_all(&o).unwrap_err(),
            StakingError::OperationInProgress(o.to_string())
        );
        drop(held);
        assert!(c.stake(&o, tokens(1), at(0)).is_ok());
    }

    #[test]
    fn issue_to_busy_account_is_rejected() {
        let c = contract();
        let (o, a) = (addr("owner"), addr("alice"));
        let held = c.guard.enter(&a).unwrap();
        assert_eq!(
            c.issue(&o, &a, tokens(5)).unwrap_err(),
            StakingError::OperationInProgress(a.to_string())
        );
        assert_eq!(c.balance_ledger().balance_of(&a), TokenAmount::ZERO);
        drop(held);
        assert_eq!(c.issue(&o, &a, tokens(5)).unwrap(), tokens(5));
    }

    #[test]
    fn backdated_stake_earns_nothing_for_the_past() {
        let c = contract_with(init(0, 1_000_000, 0, 1_000));
        let o = addr("owner");
        fund(&c, &o, tokens(2_000));
        c.stake(&o, tokens(1_000), at(500)).unwrap();
        c.stake(&o, tokens(1_000), at(100)).unwrap();
        let starts: Vec<Timestamp> = c.entries_of(&o).iter().map(|e| e.start_time()).collect();
        assert_eq!(starts, vec![at(500), at(500)]);
        assert_eq!(c.pending_reward(&o, at(500)).unwrap(), TokenAmount::ZERO);
        assert_eq!(c.balance_ledger().total_supply(), tokens(2_000));
    }

    #[test]
    fn stake_after_reward_starts_at_watermark() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(2_000));
        c.stake(&o, tokens(1_000), at(0)).unwrap();
        c.reward(&o, at(30)).unwrap();
        c.stake(&o, tokens(500), at(10)).unwrap();
        assert_eq!(c.entries_of(&o)[1].start_time(), at(30));
        assert_eq!(c.coin_age_of(&o, at(30)).unwrap(), U256::zero());
    }

    #[test]
    fn status_reports_pending_reward() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, TOKEN_UNIT.checked_add(TokenAmount::from(1_000u128)).unwrap());
        c.stake(&o, TOKEN_UNIT, at(0)).unwrap();
        let status = c.status(&o, at(365)).unwrap();
        assert_eq!(status.entries, 1);
        assert_eq!(status.staked, TOKEN_UNIT);
        assert_eq!(status.balance, TokenAmount::from(1_000u128));
        assert_eq!(status.coin_age, TOKEN_UNIT.raw() * U256::from(365u64));
        assert_eq!(status.pending_reward, TokenAmount::from(100_000_000_000_000_000u128));
    }

    #[test]
    fn snapshot_restores_stakes_and_params() {
        let c = contract();
        let o = addr("owner");
        fund(&c, &o, tokens(100));
        c.stake(&o, tokens(60), at(0)).unwrap();
        c.reward(&o, at(5)).unwrap();
        let snap = c.snapshot();
        let restored = StakingContract::from_snapshot(&snap, Arc::clone(c.balance_ledger())).unwrap();
        assert_eq!(restored.params().unwrap(), c.params().unwrap());
        assert_eq!(restored.entries_of(&o), c.entries_of(&o));
        assert_eq!(restored.owner(), c.owner());
        assert_eq!(restored.snapshot(), snap);
    }

    #[test]
    fn concurrent_rewards_respect_ceiling() {
        let c = contract_with(init(0, 2_000, 0, 365));
        let stakers: Vec<AccountAddress> = (0..8).map(|i| addr(&format!("s{i}"))).collect();
        for s in &stakers {
            fund(&c, s, tokens(200));
            c.stake(s, tokens(200), at(0)).unwrap();
        }
        // Leave 100 tokens of headroom: room for five 20-token rewards.
        fund(&c, &addr("other"), tokens(1_900));
        std::thread::scope(|scope| {
            for s in &stakers {
                let c = &c;
                scope.spawn(move || {
                    let _ = c.reward(s, at(365));
                });
            }
        });
        assert_eq!(c.balance_ledger().total_supply(), tokens(2_000));
        let rewarded = stakers
            .iter()
            .filter(|s| c.balance_ledger().balance_of(s) == tokens(20))
            .count();
        assert_eq!(rewarded, 5);
    }

    #[test]
    fn only_owner_can_issue() {
        let c = contract_with(init(0, 100, 0, 365));
        assert_eq!(
            c.issue(&addr("alice"), &addr("alice"), tokens(1)).unwrap_err(),
            StakingError::Unauthorized(addr("alice").to_string())
        );
        assert_eq!(c.issue(&addr("owner"), &addr("alice"), tokens(100)).unwrap(), tokens(100));
        assert!(matches!(
            c.issue(&addr("owner"), &addr("alice"), tokens(1)).unwrap_err(),
            StakingError::SupplyCeilingViolation { .. }
        ));
        assert_eq!(c.balance_ledger().balance_of(&addr("alice")), tokens(100));
    }
}
