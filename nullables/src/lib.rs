//! Nullable infrastructure for deterministic testing.
//!
//! Staking operations take "now" as an explicit argument; this crate supplies
//! a controllable source for it so tests never read the wall clock.

pub mod clock;

pub use clock::NullClock;
