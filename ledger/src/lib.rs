//! Bounded-supply balance ledger.
//!
//! The staking engine treats balances as an external collaborator reached
//! through [`BalanceLedger`]: it only ever credits (mints) and debits (burns)
//! accounts, and every such call enforces the configured supply bounds.
//! [`SupplyLedger`] is the in-memory implementation used by the node.

pub mod balance;
pub mod error;
pub mod snapshot;

pub use balance::{BalanceLedger, SupplyLedger};
pub use error::LedgerError;
pub use snapshot::{BalanceEntry, LedgerSnapshot};
