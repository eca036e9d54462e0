//! Invocation router
//!
//! This module provides the TicketContract that the hosting ledger drives.
//! It maps an operation name and its positional string arguments to the
//! matching handler and packages the outcome into a [`Response`] envelope.
//!
//! The router only checks the operation name and argument count. Business
//! validation belongs to the handlers in the sibling modules.
//!
//! # Operations
//!
//! | Operation      | Arguments                    | Success payload         |
//! |----------------|------------------------------|-------------------------|
//! | `/agent/add`   | organizationId               | empty                   |
//! | `/agent/list`  |                              | JSON array of members   |
//! | `/merchant`    |                              | JSON merchant member    |
//! | `/init`        | mspId                        | empty                   |
//! | `/create`      | payment JSON                 | JSON payment            |
//! | `/updateState` | `{payment_id, state}` JSON   | JSON payment            |
//! | `/get`         | paymentId                    | JSON payment            |
//! | `/history`     | paymentId                    | JSON array, newest first|
//! | `/meta/set`    | paymentId, key, value        | JSON payment            |
//! | `/meta/get`    | paymentId, key               | raw value bytes         |

use crate::config::ContractConfig;
use crate::core::traits::{Chaincode, LedgerStub};
use crate::core::{agent_registry, identity, payment_manager};
use crate::core::store::EntityStore;
use crate::types::{ContractError, PaymentCreatePayload, Response, UpdateStateRequest};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Operations exposed by the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AgentAdd,
    AgentList,
    Merchant,
    Init,
    Create,
    UpdateState,
    Get,
    History,
    MetaSet,
    MetaGet,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::AgentAdd,
        Operation::AgentList,
        Operation::Merchant,
        Operation::Init,
        Operation::Create,
        Operation::UpdateState,
        Operation::Get,
        Operation::History,
        Operation::MetaSet,
        Operation::MetaGet,
    ];

    /// Name the operation is invoked by
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AgentAdd => "/agent/add",
            Operation::AgentList => "/agent/list",
            Operation::Merchant => "/merchant",
            Operation::Init => "/init",
            Operation::Create => "/create",
            Operation::UpdateState => "/updateState",
            Operation::Get => "/get",
            Operation::History => "/history",
            Operation::MetaSet => "/meta/set",
            Operation::MetaGet => "/meta/get",
        }
    }

    /// Exact number of arguments the operation takes
    pub fn arity(&self) -> usize {
        match self {
            Operation::AgentList | Operation::Merchant => 0,
            Operation::AgentAdd
            | Operation::Init
            | Operation::Create
            | Operation::UpdateState
            | Operation::Get
            | Operation::History => 1,
            Operation::MetaGet => 2,
            Operation::MetaSet => 3,
        }
    }

    /// Reject argument lists of the wrong length
    pub fn check_arity(&self, args: &[String]) -> Result<(), ContractError> {
        if args.len() != self.arity() {
            return Err(ContractError::arguments_mismatch(self.name(), self.arity(), args));
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|operation| operation.name() == s)
            .ok_or_else(|| ContractError::bad_request(format!("unknown function: {}", s)))
    }
}

/// The ticket payment contract
///
/// Holds configuration only. Everything else, the merchant binding included,
/// is read from the ledger on every invocation.
#[derive(Debug, Clone, Default)]
pub struct TicketContract {
    config: ContractConfig,
}

impl TicketContract {
    /// Create a contract that queries the registry described by `config`
    pub fn new(config: ContractConfig) -> Self {
        TicketContract { config }
    }

    /// Bind the merchant from the first argument, or the deployer if there is none
    fn instantiate(&self, stub: &mut dyn LedgerStub) -> Result<Vec<u8>, ContractError> {
        let merchant_id = match stub.args().first() {
            Some(id) if !id.is_empty() => id.clone(),
            _ => stub.creator()?.msp_id,
        };
        let mut store = EntityStore::new(stub, &self.config);
        store.bind_merchant(&merchant_id)?;
        info!(merchant = %merchant_id, "contract instantiated");
        Ok(Vec::new())
    }

    /// Route one invocation to its handler
    fn dispatch(&self, stub: &mut dyn LedgerStub) -> Result<Vec<u8>, ContractError> {
        let operation: Operation = stub.function().parse()?;
        let args = stub.args().to_vec();
        operation.check_arity(&args)?;

        let mut store = EntityStore::new(stub, &self.config);
        match operation {
            Operation::AgentAdd => {
                let actors = identity::resolve(&store)?;
                agent_registry::add(&mut store, &args[0], &actors)?;
                Ok(Vec::new())
            }
            Operation::AgentList => to_json(&agent_registry::list(&store)?),
            Operation::Merchant => {
                let merchant_id = store.merchant_id()?.ok_or(ContractError::NotInitialized)?;
                to_json(&store.member(&merchant_id)?)
            }
            Operation::Init => {
                store.bind_merchant(&args[0])?;
                Ok(Vec::new())
            }
            Operation::Create => {
                let payload: PaymentCreatePayload = serde_json::from_str(&args[0])
                    .map_err(|e| ContractError::invalid_payload("payment", &e))?;
                let actors = identity::resolve(&store)?;
                to_json(&payment_manager::create(&mut store, payload, &actors)?)
            }
            Operation::UpdateState => {
                let request: UpdateStateRequest = serde_json::from_str(&args[0])
                    .map_err(|e| ContractError::invalid_payload("update state", &e))?;
                let next = payment_manager::validate_update(&request)?;
                let actors = identity::resolve(&store)?;
                to_json(&payment_manager::update_state(
                    &mut store,
                    &request.payment_id,
                    next,
                    &actors,
                )?)
            }
            Operation::Get => to_json(&payment_manager::get(&store, &args[0])?),
            Operation::History => to_json(&payment_manager::history(&store, &args[0])?),
            Operation::MetaSet => {
                let actors = identity::resolve(&store)?;
                let value = args[2].as_bytes().to_vec();
                to_json(&payment_manager::set_meta(&mut store, &args[0], &args[1], value, &actors)?)
            }
            Operation::MetaGet => payment_manager::get_meta(&store, &args[0], &args[1]),
        }
    }
}

impl Chaincode for TicketContract {
    fn init(&self, stub: &mut dyn LedgerStub) -> Response {
        let tx_id = stub.tx_id().to_string();
        respond(&tx_id, "init", self.instantiate(stub))
    }

    fn invoke(&self, stub: &mut dyn LedgerStub) -> Response {
        let tx_id = stub.tx_id().to_string();
        let function = stub.function().to_string();
        respond(&tx_id, &function, self.dispatch(stub))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| ContractError::ledger(format!("cannot encode response: {}", e)))
}

/// Package a handler outcome into the response envelope
fn respond(tx_id: &str, function: &str, result: Result<Vec<u8>, ContractError>) -> Response {
    match result {
        Ok(payload) => Response::success(payload),
        Err(e) => {
            warn!(tx_id, function, kind = ?e.kind(), error = %e, "invocation rejected");
            Response::error(e.to_string())
        }
    }
}
