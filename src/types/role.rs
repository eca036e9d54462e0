//! Invoker roles
//!
//! Every invocation classifies its submitter into exactly one role.
//! `Unknown` is an explicit variant: identity resolution never fails just
//! because the submitter is unrecognised, and authorization code has to
//! reject it like any other unprivileged role.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// The organization bound as this contract's merchant
    Merchant,
    /// An organization admitted to the agent registry
    Agent,
    /// A BANK-typed organization
    Bank,
    /// Anyone else
    Unknown,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Merchant, Role::Agent, Role::Bank, Role::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Merchant => "MERCHANT",
            Role::Agent => "AGENT",
            Role::Bank => "BANK",
            Role::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
