//! Organization members
//!
//! Members are owned by the external organizations registry. The contract
//! only reads them, to classify invokers and to cross-check payment payloads.

use serde::{Deserialize, Serialize};

/// Organization identifier (the MSP id of a submitter)
pub type OrganizationId = String;

/// Organization type as reported by the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrganizationType {
    Bank,
    #[default]
    Member,
    /// Any type this contract does not distinguish
    #[serde(other)]
    Other,
}

/// Bank requisites of a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisites {
    /// Settlement account payments are drawn from or paid into
    #[serde(default)]
    pub settlement_account: String,

    /// International tax number
    #[serde(default)]
    pub itn: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bik: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub correspondent_account: String,
}

/// A registered organization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub organization_id: OrganizationId,

    #[serde(default)]
    pub organization_name: String,

    #[serde(rename = "type", default)]
    pub kind: OrganizationType,

    /// The bank servicing this member (empty for banks themselves)
    #[serde(default)]
    pub bank_organization_id: OrganizationId,

    #[serde(default)]
    pub confirmed_by_bank: bool,

    #[serde(default)]
    pub requisites: Requisites,
}

impl Member {
    pub fn is_bank(&self) -> bool {
        self.kind == OrganizationType::Bank
    }

    /// Banks are exempt from bank confirmation
    pub fn is_confirmed(&self) -> bool {
        self.is_bank() || self.confirmed_by_bank
    }
}
