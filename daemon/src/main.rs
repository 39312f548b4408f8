//! `coinage`, the command-line front end for the coin-age staking node.
//!
//! Every invocation loads the saved state, runs one command against it and,
//! when the command changed anything, saves the state back.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use coinage_ledger::BalanceLedger;
use coinage_node::{init_logging, NodeConfig, StakingNode};
use coinage_types::{AccountAddress, Timestamp, TokenAmount};
use tracing::debug;

#[derive(Parser)]
#[command(name = "coinage", about = "Coin-age proof-of-stake reward ledger", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "COINAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the state file.
    #[arg(long, env = "COINAGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Owner account for a fresh ledger.
    #[arg(long, env = "COINAGE_OWNER")]
    owner: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COINAGE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COINAGE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Logical clock reading in Unix seconds. Defaults to the system clock.
    #[arg(long, env = "COINAGE_NOW")]
    now: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Initialize staking with the configured parameters (owner only).
    Init {
        #[arg(long)]
        caller: String,
    },
    /// Issue new tokens to an account (owner only).
    Issue {
        #[arg(long)]
        caller: String,
        to: String,
        /// Token quantity, e.g. "10" or "0.5".
        amount: String,
    },
    /// Move tokens between accounts.
    Transfer {
        from: String,
        to: String,
        amount: String,
    },
    /// Stake part of an account's balance.
    Stake { account: String, amount: String },
    /// Stake an account's entire balance.
    StakeAll { account: String },
    /// Withdraw every open stake of an account.
    UnstakeAll { account: String },
    /// Claim the accrued reward, keeping the stake in place.
    Reward { account: String },
    /// Print the total staked by an account.
    StakeOf { account: String },
    /// Print an account's spendable balance.
    Balance { account: String },
    /// Print a JSON report for an account.
    Status { account: String },
    /// Print the effective configuration as TOML.
    Config,
}

fn account(raw: &str) -> anyhow::Result<AccountAddress> {
    AccountAddress::parse(raw).with_context(|| format!("invalid account {raw:?}"))
}

fn amount(raw: &str) -> anyhow::Result<TokenAmount> {
    TokenAmount::parse_tokens(raw).with_context(|| format!("invalid amount {raw:?}"))
}

fn show(amount: TokenAmount) -> String {
    format!("{} ({} raw)", amount.to_token_string(), amount)
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let base = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    Ok(NodeConfig {
        data_dir: cli.data_dir.clone().unwrap_or(base.data_dir),
        owner: cli.owner.clone().or(base.owner),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        staking: base.staking,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let now = match cli.now {
        Some(secs) => Timestamp::new(secs),
        None => Timestamp::now()?,
    };
    debug!(command = ?cli.command, now = %now, data_dir = %config.data_dir.display(), "opening node");
    let node = StakingNode::open(config)?;
    let contract = node.contract();

    let changed = match &cli.command {
        Command::Init { caller } => {
            let params = node.initialize(&account(caller)?, now)?;
            println!(
                "initialized: supply bounds [{}, {}], stake age [{}s, {}s], precision {}",
                params.bounds.min_total_supply.to_token_string(),
                params.bounds.max_total_supply.to_token_string(),
                params.stake_min_age,
                params.stake_max_age,
                params.stake_precision
            );
            true
        }
        Command::Issue { caller, to, amount: raw } => {
            let issued = contract.issue(&account(caller)?, &account(to)?, amount(raw)?)?;
            println!("issued {}", show(issued));
            true
        }
        Command::Transfer { from, to, amount: raw } => {
            let value = amount(raw)?;
            node.ledger().transfer(&account(from)?, &account(to)?, value)?;
            println!("transferred {}", show(value));
            true
        }
        Command::Stake { account: who, amount: raw } => {
            let staked = contract.stake(&account(who)?, amount(raw)?, now)?;
            println!("staked {}", show(staked));
            true
        }
        Command::StakeAll { account: who } => {
            let staked = contract.stake_all(&account(who)?, now)?;
            println!("staked {}", show(staked));
            true
        }
        Command::UnstakeAll { account: who } => {
            let withdrawn = contract.unstake_all(&account(who)?)?;
            println!("unstaked {}", show(withdrawn));
            true
        }
        Command::Reward { account: who } => {
            let minted = contract.reward(&account(who)?, now)?;
            println!("rewarded {}", show(minted));
            !minted.is_zero()
        }
        Command::StakeOf { account: who } => {
            println!("{}", show(contract.stake_of(&account(who)?)));
            false
        }
        Command::Balance { account: who } => {
            println!("{}", show(node.ledger().balance_of(&account(who)?)));
            false
        }
        Command::Status { account: who } => {
            let status = contract.status(&account(who)?, now)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            false
        }
        Command::Config => false,
    };

    if changed {
        node.save(now)
            .with_context(|| format!("saving state to {}", node.state_file().path().display()))?;
    }
    Ok(())
}
