//! Per-account stake lists.

use std::collections::HashMap;

use coinage_types::{AccountAddress, Timestamp, TokenAmount};

use crate::entry::StakeEntry;

/// Maps each account to its open stake entries, in insertion order.
///
/// The ledger does no validation: balance and supply checks happen in the
/// contract before any entry is added or removed. It is not synchronized
/// either; the contract owns it behind a lock.
#[derive(Clone, Debug, Default)]
pub struct StakeLedger {
    stakes: HashMap<AccountAddress, Vec<StakeEntry>>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry and return the time it was stamped with. Repeated
    /// stakes never merge.
    ///
    /// The stamp is never earlier than the latest start or reward watermark
    /// already on the account, so start times stay non-decreasing and a new
    /// entry cannot claim age from before an earlier reward.
    pub fn add_entry(
        &mut self,
        account: &AccountAddress,
        amount: TokenAmount,
        time: Timestamp,
    ) -> Timestamp {
        let stamp = self.latest_time(account).map_or(time, |latest| latest.max(time));
        self.stakes
            .entry(account.clone())
            .or_default()
            .push(StakeEntry::new(amount, stamp));
        stamp
    }

    /// Latest start or reward watermark among the account's open entries.
    pub fn latest_time(&self, account: &AccountAddress) -> Option<Timestamp> {
        self.entries(account)
            .iter()
            .map(|e| e.start_time().max(e.rewarded_until()))
            .max()
    }

    /// Sum of all open entry amounts; zero for an account with no entries.
    pub fn total_amount(&self, account: &AccountAddress) -> TokenAmount {
        self.entries(account)
            .iter()
            .fold(TokenAmount::ZERO, |acc, e| acc.saturating_add(e.amount()))
    }

    /// Remove every entry for `account`, returning what they summed to.
    pub fn clear_all(&mut self, account: &AccountAddress) -> TokenAmount {
        let total = self.total_amount(account);
        self.stakes.remove(account);
        total
    }

    pub fn entries(&self, account: &AccountAddress) -> &[StakeEntry] {
        self.stakes.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry_count(&self, account: &AccountAddress) -> usize {
        self.entries(account).len()
    }

    pub fn has_entries(&self, account: &AccountAddress) -> bool {
        self.entry_count(account) > 0
    }

    /// Advance each entry's reward watermark, positionally.
    ///
    /// `watermarks` must come from the same entry list it is applied to; the
    /// caller holds the account's guard so the list cannot change in between.
    pub fn roll_over(&mut self, account: &AccountAddress, watermarks: &[Timestamp]) {
        if let Some(entries) = self.stakes.get_mut(account) {
            for (entry, to) in entries.iter_mut().zip(watermarks) {
                entry.advance_rewarded_until(*to);
            }
        }
    }

    /// Number of accounts with at least one open entry.
    pub fn account_count(&self) -> usize {
        self.stakes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountAddress, &[StakeEntry])> {
        self.stakes.iter().map(|(a, e)| (a, e.as_slice()))
    }

    /// Install a restored entry list, replacing whatever was there.
    pub fn restore(&mut self, account: AccountAddress, entries: Vec<StakeEntry>) {
        if entries.is_empty() {
            self.stakes.remove(&account);
        } else {
            self.stakes.insert(account, entries);
        }
    }
}
