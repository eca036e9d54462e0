//! Single-node network for running the contract
//!
//! A `Sandbox` wires a [`MemoryLedger`], an [`OrganizationsRegistry`] and a
//! [`TicketContract`] together. The replay tool runs scripts against it and
//! the tests use it, together with [`fixtures`], as their network.

use crate::config::ContractConfig;
use crate::core::{PeerContract, TicketContract};
use crate::ledger::memory::{Invocation, MemoryLedger};
use crate::ledger::organizations::OrganizationsRegistry;
use crate::types::Member;
use std::sync::Arc;

/// A ledger, its organizations registry and one deployed contract
pub struct Sandbox {
    ledger: MemoryLedger,
    organizations: Arc<OrganizationsRegistry>,
    contract: TicketContract,
}

impl Sandbox {
    /// Create a sandbox whose registry is reachable where `config` says
    pub fn new(config: ContractConfig) -> Self {
        Self::with_ledger(MemoryLedger::new(), config)
    }

    /// Create a sandbox on an existing (usually empty) ledger
    pub fn with_ledger(ledger: MemoryLedger, config: ContractConfig) -> Self {
        let organizations = Arc::new(OrganizationsRegistry::new());
        ledger.register_peer(
            &config.organizations_contract,
            &config.organizations_channel,
            Arc::clone(&organizations) as Arc<dyn PeerContract>,
        );
        Sandbox {
            ledger,
            organizations,
            contract: TicketContract::new(config),
        }
    }

    /// Load members into the organizations registry
    pub fn register_members(&self, members: impl IntoIterator<Item = Member>) {
        for member in members {
            self.organizations.register(member);
        }
    }

    /// Instantiate the contract as `deployer`
    pub fn deploy(&self, deployer: &str, args: &[&str]) -> Invocation {
        self.ledger.init(&self.contract, deployer, &to_strings(args))
    }

    /// Submit one invocation as `creator`
    pub fn invoke(&self, creator: &str, function: &str, args: &[&str]) -> Invocation {
        self.ledger
            .invoke(&self.contract, creator, function, &to_strings(args))
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    pub fn organizations(&self) -> &OrganizationsRegistry {
        &self.organizations
    }

    pub fn contract(&self) -> &TicketContract {
        &self.contract
    }
}

fn to_strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// A small network of members shared by tests and benchmarks
///
/// - `MerchantMSP`: the merchant, serviced by `BankMSP`
/// - `AgentMSP`: agent serviced by `BankMSP`
/// - `Agent2MSP`: agent serviced by `Bank2MSP`
/// - `BankMSP`, `Bank2MSP`: banks
/// - `SomeMSP`: a member its bank never confirmed
pub mod fixtures {
    use super::Sandbox;
    use crate::config::ContractConfig;
    use crate::types::{Member, OrganizationType, PaymentCreatePayload, PaymentState, Requisites};

    pub const MERCHANT: &str = "MerchantMSP";
    pub const AGENT: &str = "AgentMSP";
    pub const AGENT2: &str = "Agent2MSP";
    pub const BANK: &str = "BankMSP";
    pub const BANK2: &str = "Bank2MSP";
    pub const UNCONFIRMED: &str = "SomeMSP";

    pub const BANK_ITN: &str = "7700000001";
    pub const BANK2_ITN: &str = "7700000002";
    pub const MERCHANT_ITN: &str = "7700000003";
    pub const AGENT_ITN: &str = "7700000004";
    pub const UNCONFIRMED_ITN: &str = "7700000005";
    pub const AGENT2_ITN: &str = "7700000006";

    pub const MERCHANT_ACCOUNT: &str = "40702810000000000003";
    pub const AGENT_ACCOUNT: &str = "40702810000000000004";
    pub const AGENT2_ACCOUNT: &str = "40702810000000000006";

    /// Amount of every fixture payment, in minor units
    pub const AMOUNT: u64 = 12500;

    fn member(
        id: &str,
        kind: OrganizationType,
        bank: &str,
        confirmed: bool,
        itn: &str,
        account: &str,
    ) -> Member {
        Member {
            organization_id: id.to_string(),
            organization_name: format!("{} organization", id.trim_end_matches("MSP")),
            kind,
            bank_organization_id: bank.to_string(),
            confirmed_by_bank: confirmed,
            requisites: Requisites {
                settlement_account: account.to_string(),
                itn: itn.to_string(),
                ..Requisites::default()
            },
        }
    }

    pub fn members() -> Vec<Member> {
        vec![
            member(BANK, OrganizationType::Bank, "", false, BANK_ITN, "30101810000000000001"),
            member(BANK2, OrganizationType::Bank, "", false, BANK2_ITN, "30101810000000000002"),
            member(MERCHANT, OrganizationType::Member, BANK, true, MERCHANT_ITN, MERCHANT_ACCOUNT),
            member(AGENT, OrganizationType::Member, BANK, true, AGENT_ITN, AGENT_ACCOUNT),
            member(AGENT2, OrganizationType::Member, BANK2, true, AGENT2_ITN, AGENT2_ACCOUNT),
            member(
                UNCONFIRMED,
                OrganizationType::Member,
                BANK,
                false,
                UNCONFIRMED_ITN,
                "40702810000000000005",
            ),
        ]
    }

    /// Sandbox with every fixture member registered and nothing deployed
    pub fn sandbox() -> Sandbox {
        let sandbox = Sandbox::new(ContractConfig::default());
        sandbox.register_members(members());
        sandbox
    }

    /// Sandbox with the contract deployed by the merchant and both agents added
    pub fn deployed_sandbox() -> Sandbox {
        let sandbox = sandbox();
        sandbox.deploy(MERCHANT, &[]);
        sandbox.invoke(MERCHANT, "/agent/add", &[AGENT]);
        sandbox.invoke(MERCHANT, "/agent/add", &[AGENT2]);
        sandbox
    }

    /// A valid creation payload for a payment by `agent` (`AGENT` or `AGENT2`)
    pub fn create_payload(id: &str, agent: &str) -> PaymentCreatePayload {
        let (itn, account) = if agent == AGENT2 {
            (AGENT2_ITN, AGENT2_ACCOUNT)
        } else {
            (AGENT_ITN, AGENT_ACCOUNT)
        };
        PaymentCreatePayload {
            id: id.to_string(),
            agent_id: agent.to_string(),
            amount: AMOUNT,
            currency: "RUB".to_string(),
            international_flight: false,
            payment_type: "SALE".to_string(),
            payer_id: "passenger-1".to_string(),
            payer_account: account.to_string(),
            payer_number: itn.to_string(),
            recipient_id: "airline".to_string(),
            recipient_account: MERCHANT_ACCOUNT.to_string(),
            recipient_number: MERCHANT_ITN.to_string(),
            vat_included: true,
        }
    }

    /// `/updateState` argument moving `id` to `state`
    pub fn update_state(id: &str, state: PaymentState) -> String {
        serde_json::json!({ "payment_id": id, "state": state.as_str() }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployed_sandbox_has_merchant_and_agents() {
        let sandbox = fixtures::deployed_sandbox();
        let invocation = sandbox.invoke(fixtures::BANK, "/agent/list", &[]);
        assert!(invocation.response.is_ok());
        let agents: Vec<Member> = serde_json::from_slice(&invocation.response.payload).unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(sandbox.organizations().len(), fixtures::members().len());
    }

    #[test]
    fn test_fixture_payload_is_accepted() {
        let sandbox = fixtures::deployed_sandbox();
        for agent in [fixtures::AGENT, fixtures::AGENT2] {
            let id = format!("p-{}", agent);
            let payload = serde_json::to_string(&fixtures::create_payload(&id, agent)).unwrap();
            let invocation = sandbox.invoke(agent, "/create", &[&payload]);
            assert!(invocation.response.is_ok(), "{}", invocation.response.message);
        }
    }
}
