//! Ledger snapshots: every balance plus the supply counter.
//!
//! Snapshots are how the node persists the balance ledger between runs. The
//! hash is computed deterministically from the sorted balances so a corrupted
//! or hand-edited state file is detected on load.

use serde::{Deserialize, Serialize};

use coinage_types::{AccountAddress, Timestamp, TokenAmount};

use crate::error::LedgerError;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A ledger snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over the balances and total supply.
    pub hash: [u8; 32],
    /// Logical time at which the snapshot was taken.
    pub created_at: Timestamp,
    /// Non-zero balances, sorted by address.
    pub balances: Vec<BalanceEntry>,
    pub total_supply: TokenAmount,
    pub version: u32,
}

/// One account's balance inside a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub address: AccountAddress,
    pub balance: TokenAmount,
}

impl LedgerSnapshot {
    pub fn create(
        balances: Vec<BalanceEntry>,
        total_supply: TokenAmount,
        created_at: Timestamp,
    ) -> Self {
        let mut snap = Self {
            hash: [0u8; 32],
            created_at,
            balances,
            total_supply,
            version: SNAPSHOT_VERSION,
        };
        snap.hash = snap.compute_hash();
        snap
    }

    fn compute_hash(&self) -> [u8; 32] {
        use blake2::digest::consts::U32;
        use blake2::{Blake2b, Digest};

        let mut hasher = Blake2b::<U32>::new();
        let mut word = [0u8; 32];
        for entry in &self.balances {
            hasher.update(entry.address.as_str().as_bytes());
            hasher.update([0u8]);
            entry.balance.raw().to_little_endian(&mut word);
            hasher.update(word);
        }
        self.total_supply.raw().to_little_endian(&mut word);
        hasher.update(word);
        hasher.update(self.version.to_le_bytes());

        let result = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&result);
        out
    }

    /// Verify the snapshot hash matches its contents.
    pub fn verify(&self) -> bool {
        self.hash == self.compute_hash()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}
