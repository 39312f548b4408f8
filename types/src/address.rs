//! Account address type with `cg_` prefix.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account on the staking ledger, always prefixed with `cg_`.
///
/// Addresses are the sole key for both balances and stake lists; nothing
/// beyond the prefix and a non-empty, printable body is checked.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "cg_";

    /// Parse and validate a raw address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let body = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(format!("{s}: missing {} prefix", Self::PREFIX)))?;
        if body.is_empty() {
            return Err(TypesError::InvalidAddress(format!("{s}: empty body")));
        }
        if !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TypesError::InvalidAddress(format!(
                "{s}: only ASCII letters, digits and '_' are allowed"
            )));
        }
        Ok(Self(s))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}
