//! Core traits for ledger access, peer contracts and contract dispatch
//!
//! The contract never talks to a concrete ledger. It sees one transaction's
//! view of the ledger through [`LedgerStub`], calls other contracts through
//! [`PeerContract`], and is itself driven by the host through [`Chaincode`].
//! The in-memory host in [`crate::ledger`] implements all three seams.

use crate::core::keys;
use crate::types::{ContractError, Identity, KeyModification, Response, StateEntry};

/// One transaction's view of the hosting ledger
///
/// Reads observe committed state only; writes and the event are buffered and
/// applied by the host if, and only if, the invocation succeeds and passes
/// commit validation.
pub trait LedgerStub {
    /// Identifier of the running transaction
    fn tx_id(&self) -> &str;

    /// Operation name of the running invocation
    fn function(&self) -> &str;

    /// Positional string arguments of the running invocation
    fn args(&self) -> &[String];

    /// Identity of the transaction submitter
    fn creator(&self) -> Result<Identity, ContractError>;

    /// Read a committed value
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, ContractError>;

    /// Buffer a write for commit
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), ContractError>;

    /// Scan committed keys in `[start, end)` in ascending key order
    fn get_state_by_range(&self, start: &str, end: &str)
        -> Result<Vec<StateEntry>, ContractError>;

    /// Full modification history of a key, newest first
    fn get_history_for_key(&self, key: &str) -> Result<Vec<KeyModification>, ContractError>;

    /// Invoke another contract on the same ledger
    fn invoke_contract(&self, name: &str, args: &[String], channel: &str) -> Response;

    /// Set the transaction's event, replacing any earlier one
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), ContractError>;

    /// Scan every key under a composite-key prefix
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<StateEntry>, ContractError> {
        let (start, end) = keys::composite_key_range(object_type, attributes)?;
        self.get_state_by_range(&start, &end)
    }
}

/// A read-only contract reachable through [`LedgerStub::invoke_contract`]
pub trait PeerContract: Send + Sync {
    /// Answer a query; the first element of `args` is the function name
    fn query(&self, args: &[String]) -> Response;
}

/// A contract driven by the hosting ledger
pub trait Chaincode: Send + Sync {
    /// Instantiate the contract
    fn init(&self, stub: &mut dyn LedgerStub) -> Response;

    /// Handle one invocation
    fn invoke(&self, stub: &mut dyn LedgerStub) -> Response;
}
