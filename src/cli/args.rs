use crate::config::{ContractConfig, DEFAULT_ORGANIZATIONS_CONTRACT, DEFAULT_SYSTEM_CHANNEL};
use crate::ledger::memory::DEFAULT_GENESIS_TIME;
use crate::replay::ReplayOptions;
use clap::Parser;
use std::path::PathBuf;

/// Replay ticket payment invocations against an in-memory ledger
#[derive(Parser, Debug)]
#[command(name = "ticket-ledger")]
#[command(about = "Replay ticket payment invocations against an in-memory ledger", long_about = None)]
pub struct CliArgs {
    /// Replay script: CSV rows of creator, function and arguments
    #[arg(value_name = "SCRIPT", help = "Path to the replay script CSV file")]
    pub script: PathBuf,

    /// JSON array of members loaded into the organizations registry
    #[arg(
        long = "members",
        value_name = "MEMBERS_JSON",
        help = "Path to the JSON file with organization members"
    )]
    pub members: PathBuf,

    /// Merchant to bind at instantiation
    #[arg(
        long = "merchant",
        value_name = "MSP",
        help = "Merchant MSP id (default: the deployer)"
    )]
    pub merchant: Option<String>,

    /// Identity that instantiates the contract
    #[arg(
        long = "deployer",
        value_name = "MSP",
        default_value = "MerchantMSP",
        help = "MSP id instantiating the contract"
    )]
    pub deployer: String,

    /// Name of the organizations registry contract
    #[arg(
        long = "organizations-contract",
        value_name = "NAME",
        default_value = DEFAULT_ORGANIZATIONS_CONTRACT,
        help = "Name of the organizations registry contract"
    )]
    pub organizations_contract: String,

    /// Channel the organizations registry is deployed on
    #[arg(
        long = "channel",
        value_name = "NAME",
        default_value = DEFAULT_SYSTEM_CHANNEL,
        help = "Channel of the organizations registry"
    )]
    pub channel: String,

    /// Genesis time of the ledger in seconds
    #[arg(
        long = "genesis-time",
        value_name = "SECS",
        default_value_t = DEFAULT_GENESIS_TIME,
        help = "Ledger genesis time in seconds; transaction N is stamped genesis + N"
    )]
    pub genesis_time: i64,
}

impl CliArgs {
    /// Build replay options from the parsed arguments
    ///
    /// Blank registry names fall back to the defaults, and a blank merchant
    /// means the deployer is bound.
    pub fn to_replay_options(&self) -> ReplayOptions {
        ReplayOptions {
            script: self.script.clone(),
            members: self.members.clone(),
            merchant: self
                .merchant
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            deployer: self.deployer.clone(),
            config: ContractConfig::new(&self.organizations_contract, &self.channel),
            genesis_time: self.genesis_time,
        }
    }
}
