//! Entity store
//!
//! Typed access to everything the contract keeps on the ledger: the merchant
//! binding, the agent registry and payment records, plus read-only lookups of
//! members in the organizations registry. All values are JSON.
//!
//! The store holds no state of its own. Every call goes to the transaction's
//! [`LedgerStub`], so nothing read in one invocation survives into the next.

use crate::config::ContractConfig;
use crate::core::keys;
use crate::core::traits::LedgerStub;
use crate::types::{
    ContractError, EventName, Identity, KeyModification, Member, Payment, StateChangedEvent,
};
use tracing::debug;

const GET_MEMBER_FUNCTION: &str = "/get";
const GET_MEMBER_BY_ITN_FUNCTION: &str = "/member/byITN";

/// Typed view over one transaction's ledger stub
pub struct EntityStore<'a> {
    stub: &'a mut dyn LedgerStub,
    config: &'a ContractConfig,
}

impl<'a> EntityStore<'a> {
    pub fn new(stub: &'a mut dyn LedgerStub, config: &'a ContractConfig) -> Self {
        EntityStore { stub, config }
    }

    /// Identity of the transaction submitter
    pub fn creator(&self) -> Result<Identity, ContractError> {
        self.stub.creator()
    }

    // Merchant binding

    /// Organization id bound as merchant, if any
    pub fn merchant_id(&self) -> Result<Option<String>, ContractError> {
        let value = self.stub.get_state(keys::MERCHANT_KEY)?;
        match value {
            Some(bytes) if !bytes.is_empty() => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| ContractError::ledger(format!("merchant binding is not UTF-8: {}", e))),
            _ => Ok(None),
        }
    }

    /// Write the merchant binding
    ///
    /// # Errors
    ///
    /// - `AlreadyInitialized` if a binding exists; it is never overwritten
    /// - `BadRequest` if `merchant_id` is empty
    pub fn bind_merchant(&mut self, merchant_id: &str) -> Result<(), ContractError> {
        if merchant_id.is_empty() {
            return Err(ContractError::bad_request("merchant id is empty"));
        }
        if let Some(existing) = self.merchant_id()? {
            return Err(ContractError::AlreadyInitialized {
                merchant_id: existing,
            });
        }
        debug!(merchant_id, "binding merchant");
        self.stub
            .put_state(keys::MERCHANT_KEY, merchant_id.as_bytes().to_vec())
    }

    // Organizations registry

    /// Fetch a member without checking bank confirmation
    ///
    /// Returns `Ok(None)` when the registry answers with an empty payload.
    pub fn lookup_member(&self, id: &str) -> Result<Option<Member>, ContractError> {
        let response = self.query_organizations(GET_MEMBER_FUNCTION, id);
        if !response.is_ok() {
            return Err(ContractError::UpstreamFailure {
                message: response.message,
            });
        }
        if response.payload.is_empty() {
            return Ok(None);
        }
        decode_member(&response.payload).map(Some)
    }

    /// Fetch a member and require it to be confirmed by its bank
    ///
    /// # Errors
    ///
    /// - `UpstreamFailure` if the registry rejects the query
    /// - `MemberNotFound` if the registry has no such member
    /// - `NotConfirmed` if the member is not a bank and is unconfirmed
    pub fn member(&self, id: &str) -> Result<Member, ContractError> {
        let member = self
            .lookup_member(id)?
            .ok_or_else(|| ContractError::member_not_found(id))?;
        if !member.is_confirmed() {
            return Err(ContractError::NotConfirmed { id: id.to_string() });
        }
        Ok(member)
    }

    /// Fetch a member by international tax number
    pub fn member_by_itn(&self, itn: &str) -> Result<Member, ContractError> {
        let response = self.query_organizations(GET_MEMBER_BY_ITN_FUNCTION, itn);
        if !response.is_ok() {
            return Err(ContractError::ItnLookupFailed {
                itn: itn.to_string(),
                message: response.message,
            });
        }
        if response.payload.is_empty() {
            return Err(ContractError::MemberByItnNotFound {
                itn: itn.to_string(),
            });
        }
        decode_member(&response.payload)
    }

    fn query_organizations(&self, function: &str, argument: &str) -> crate::types::Response {
        debug!(
            contract = %self.config.organizations_contract,
            function,
            argument,
            "querying organizations registry"
        );
        self.stub.invoke_contract(
            &self.config.organizations_contract,
            &[function.to_string(), argument.to_string()],
            &self.config.organizations_channel,
        )
    }

    // Agent registry

    pub fn is_agent(&self, organization_id: &str) -> Result<bool, ContractError> {
        let key = keys::agent_key(organization_id)?;
        Ok(self.stub.get_state(&key)?.is_some())
    }

    /// Register an agent; re-adding overwrites the same value
    pub fn put_agent(&mut self, organization_id: &str) -> Result<(), ContractError> {
        let key = keys::agent_key(organization_id)?;
        self.stub.put_state(&key, organization_id.as_bytes().to_vec())
    }

    /// Registered agent ids in key order
    pub fn agent_ids(&self) -> Result<Vec<String>, ContractError> {
        self.stub
            .get_state_by_partial_composite_key(keys::AGENT_OBJECT_TYPE, &[])?
            .into_iter()
            .map(|entry| {
                String::from_utf8(entry.value).map_err(|e| {
                    ContractError::ledger(format!("agent entry {:?} is not UTF-8: {}", entry.key, e))
                })
            })
            .collect()
    }

    // Payments

    pub fn payment_exists(&self, payment_id: &str) -> Result<bool, ContractError> {
        Ok(self.stub.get_state(&keys::payment_key(payment_id))?.is_some())
    }

    pub fn payment(&self, payment_id: &str) -> Result<Option<Payment>, ContractError> {
        let key = keys::payment_key(payment_id);
        match self.stub.get_state(&key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ContractError::corrupt_state(&key, &e)),
            None => Ok(None),
        }
    }

    /// Persist the full payment record under its key
    pub fn put_payment(&mut self, payment: &Payment) -> Result<(), ContractError> {
        let key = keys::payment_key(&payment.id);
        let bytes = serde_json::to_vec(payment)
            .map_err(|e| ContractError::ledger(format!("cannot encode payment: {}", e)))?;
        self.stub.put_state(&key, bytes)
    }

    /// Every recorded version of a payment, in the ledger's order (newest first)
    pub fn payment_history(&self, payment_id: &str) -> Result<Vec<KeyModification>, ContractError> {
        self.stub
            .get_history_for_key(&keys::payment_key(payment_id))
    }

    // Events

    /// Publish an event on the transaction's event channel
    pub fn emit(&mut self, name: EventName, event: &StateChangedEvent) -> Result<(), ContractError> {
        let bytes = serde_json::to_vec(event)
            .map_err(|e| ContractError::ledger(format!("cannot encode event: {}", e)))?;
        self.stub.set_event(name.as_str(), bytes)
    }
}

fn decode_member(payload: &[u8]) -> Result<Member, ContractError> {
    serde_json::from_slice(payload).map_err(|e| ContractError::UpstreamFailure {
        message: format!("invalid member payload from organizations registry: {}", e),
    })
}
