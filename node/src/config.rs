//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use coinage_types::time::SECONDS_PER_DAY;
use coinage_types::{AccountAddress, InitParams, TokenAmount};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a staking node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory holding the state file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The only account allowed to initialize staking. Required before the
    /// first `init`; afterwards the owner recorded in the state file wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Parameters used by `init`.
    #[serde(default)]
    pub staking: StakingConfig,
}

/// The `[staking]` table. Supply bounds are whole tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default = "default_min_total_supply")]
    pub min_total_supply: u64,

    #[serde(default = "default_max_total_supply")]
    pub max_total_supply: u64,

    #[serde(default = "default_stake_min_age_secs")]
    pub stake_min_age_secs: u64,

    #[serde(default = "default_stake_max_age_secs")]
    pub stake_max_age_secs: u64,

    #[serde(default = "default_stake_precision")]
    pub stake_precision: u32,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./coinage_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_total_supply() -> u64 {
    1_000_000
}

fn default_max_total_supply() -> u64 {
    10_000_000
}

fn default_stake_min_age_secs() -> u64 {
    3 * SECONDS_PER_DAY
}

fn default_stake_max_age_secs() -> u64 {
    90 * SECONDS_PER_DAY
}

fn default_stake_precision() -> u32 {
    18
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// The configured owner, validated.
    pub fn owner(&self) -> Result<Option<AccountAddress>, NodeError> {
        self.owner
            .as_deref()
            .map(AccountAddress::parse)
            .transpose()
            .map_err(NodeError::from)
    }
}

impl StakingConfig {
    /// Convert to raw-unit initialization parameters.
    pub fn to_init_params(&self) -> Result<InitParams, NodeError> {
        let whole = |n: u64, field: &str| {
            TokenAmount::from_tokens(u128::from(n))
                .ok_or_else(|| NodeError::Config(format!("{field} out of range")))
        };
        Ok(InitParams {
            min_total_supply: whole(self.min_total_supply, "min_total_supply")?,
            max_total_supply: whole(self.max_total_supply, "max_total_supply")?,
            stake_min_age: self.stake_min_age_secs,
            stake_max_age: self.stake_max_age_secs,
            stake_precision: self.stake_precision,
        })
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            owner: None,
            staking: StakingConfig::default(),
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_total_supply: default_min_total_supply(),
            max_total_supply: default_max_total_supply(),
            stake_min_age_secs: default_stake_min_age_secs(),
            stake_max_age_secs: default_stake_max_age_secs(),
            stake_precision: default_stake_precision(),
        }
    }
}
