//! Fundamental types for the Coinage staking engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, 256-bit token amounts, timestamps and staking parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod time;

pub use address::AccountAddress;
pub use amount::{TokenAmount, TOKEN_UNIT};
pub use error::TypesError;
pub use params::{InitParams, StakingParams, SupplyBounds};
pub use primitive_types::U256;
pub use time::Timestamp;
