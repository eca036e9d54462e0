//! Contract configuration
//!
//! The only tunables are where the organizations registry lives. Empty values
//! fall back to the defaults, the same way blank CLI flags do.

/// Default name of the organizations registry contract
pub const DEFAULT_ORGANIZATIONS_CONTRACT: &str = "organizations";

/// Default channel the organizations registry is deployed on
pub const DEFAULT_SYSTEM_CHANNEL: &str = "mychannel";

/// Location of the collaborator contracts this contract queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Name of the organizations registry contract
    pub organizations_contract: String,

    /// Channel the organizations registry is deployed on
    pub organizations_channel: String,
}

impl ContractConfig {
    /// Create a configuration, replacing empty values with defaults
    pub fn new(organizations_contract: &str, organizations_channel: &str) -> Self {
        let default = ContractConfig::default();
        ContractConfig {
            organizations_contract: non_empty_or(organizations_contract, default.organizations_contract),
            organizations_channel: non_empty_or(organizations_channel, default.organizations_channel),
        }
    }
}

impl Default for ContractConfig {
    fn default() -> Self {
        ContractConfig {
            organizations_contract: DEFAULT_ORGANIZATIONS_CONTRACT.to_string(),
            organizations_channel: DEFAULT_SYSTEM_CHANNEL.to_string(),
        }
    }
}

fn non_empty_or(value: &str, fallback: String) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback
    } else {
        value.to_string()
    }
}
