//! Token amounts.
//!
//! Amounts are 256-bit unsigned integers counted in raw units. One whole
//! token is `10^18` raw units, the same 18-decimal convention the interest
//! rate is scaled by.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Number of decimal places in one whole token.
pub const TOKEN_DECIMALS: usize = 18;

/// One whole token in raw units (`10^18`).
pub const TOKEN_UNIT: TokenAmount = TokenAmount(U256([1_000_000_000_000_000_000, 0, 0, 0]));

/// A balance, stake or reward amount in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));

    pub fn new(raw: U256) -> Self {
        Self(raw)
    }

    /// Whole tokens scaled up to raw units, or `None` on overflow.
    pub fn from_tokens(whole: u128) -> Option<Self> {
        U256::from(whole).checked_mul(TOKEN_UNIT.0).map(Self)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Render as a decimal token quantity, e.g. `8.219178082191780821`.
    pub fn to_token_string(&self) -> String {
        let (whole, frac) = self.0.div_mod(TOKEN_UNIT.0);
        if frac.is_zero() {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    /// Parse a decimal token quantity such as `12` or `0.25` into raw units.
    ///
    /// At most [`TOKEN_DECIMALS`] fractional digits are accepted.
    pub fn parse_tokens(s: &str) -> Result<Self, TypesError> {
        let bad = |why: &str| TypesError::InvalidParams(format!("bad token amount {s:?}: {why}"));
        let s = s.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(bad("empty"));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(bad("only digits and one '.' are allowed"));
        }
        if frac.len() > TOKEN_DECIMALS {
            return Err(bad("too many decimal places"));
        }
        let digits = format!("{whole}{frac:0<width$}", width = TOKEN_DECIMALS);
        U256::from_dec_str(&digits)
            .map(Self)
            .map_err(|_| bad("out of range"))
    }
}

impl From<u128> for TokenAmount {
    fn from(raw: u128) -> Self {
        Self(U256::from(raw))
    }
}

impl From<U256> for TokenAmount {
    fn from(raw: U256) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses a raw decimal integer (no fractional part).
impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_dec_str(s.trim())
            .map(Self)
            .map_err(|e| TypesError::InvalidParams(format!("bad amount {s:?}: {e:?}")))
    }
}
