//! Error types for the ticket payment contract
//!
//! Every failure aborts the current invocation and its `Display` text is
//! returned to the caller unmodified as the response message. Several of these
//! messages embed state and role names and are part of the observable
//! contract, so the tests below pin them verbatim.
//!
//! # Error Categories
//!
//! - **Initialization**: merchant binding missing or already set
//! - **Lookup**: payments and members that do not exist
//! - **Authorization**: roles that may not perform an operation
//! - **Consistency**: payload fields that disagree with registered members
//! - **Transitions**: state changes outside the legal edge table
//! - **Ledger**: collaborator failures, commit conflicts, corrupt state

use crate::types::payment::PaymentState;
use crate::types::role::Role;
use thiserror::Error;

/// Coarse classification of [`ContractError`]
///
/// Callers that only need to know *what kind* of failure happened (tests,
/// the replay tool's reports) match on this instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    AlreadyInitialized,
    NotFound,
    AlreadyExists,
    Forbidden,
    RoleMismatch,
    AgentMismatch,
    BankMismatch,
    AccountMismatch,
    IllegalTransition,
    BadRequest,
    UpstreamFailure,
    Conflict,
    Ledger,
}

/// Main error type for the contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractError {
    /// No merchant binding has been written yet
    #[error("merchantId not set in state")]
    NotInitialized,

    /// A merchant binding already exists and cannot be replaced
    #[error("MerchantId already set: {merchant_id}")]
    AlreadyInitialized { merchant_id: String },

    /// The organizations registry has no member with this id
    #[error("member not found: {id}")]
    MemberNotFound { id: String },

    /// The member exists but its bank has not confirmed it
    #[error("member is not confirmed by bank: {id}")]
    NotConfirmed { id: String },

    /// No member is registered under the given tax number
    #[error("Member with itn {itn} not found")]
    MemberByItnNotFound { itn: String },

    /// The organizations registry rejected a lookup by tax number
    #[error("Error getting member by itn: {itn}, error: {message}")]
    ItnLookupFailed { itn: String, message: String },

    /// The organizations registry returned an error status
    #[error("{message}")]
    UpstreamFailure { message: String },

    /// The invoking agent's bank organization cannot be resolved
    #[error("bank organization {bank_id} not found: {reason}")]
    BankNotFound { bank_id: String, reason: String },

    #[error("payment not found with id {id}")]
    PaymentNotFound { id: String },

    #[error("meta key {key} not found for payment {id}")]
    MetaNotFound { id: String, key: String },

    #[error("payment already exists")]
    PaymentAlreadyExists { id: String },

    /// Only the merchant may register agents
    #[error("only merchant can add agent, your role is: {role}")]
    MerchantRequired { role: Role },

    /// Only a registered agent may create payments
    #[error("only agent can add payment, your role is: {role}, id: {invoker}")]
    AgentRequired { role: Role, invoker: String },

    /// Only the merchant or the paying agent may attach metadata
    #[error("only merchant or payment owner can set meta, your role is: {role}")]
    MetaForbidden { role: Role },

    /// The role guard does not list this role for the payment's current state
    #[error("role can't change from state: {state}, role: {role}")]
    RoleCannotChangeFromState { state: PaymentState, role: Role },

    /// The payer tax number resolves to a different organization than the invoker
    #[error("agent itn mismatch in payment attributes {organization_id}")]
    AgentItnMismatch { organization_id: String },

    /// An agent tried to move a payment created by another agent
    #[error("agent can't operate with payment of another agent. try to updatestate from: {invoker}, payment originally from: {payer}")]
    ForeignAgentPayment { invoker: String, payer: String },

    /// A bank tried to move a payment serviced by another bank
    #[error("bank can't process payment of another bank")]
    ForeignBankPayment { invoker: String, payer_bank: String },

    #[error("agent account mismatch in payment attributes, agent account: {agent_account}, payerAccount: {payer_account}")]
    PayerAccountMismatch {
        agent_account: String,
        payer_account: String,
    },

    #[error("merchant account mismatch in payment attributes, merchant account: {merchant_account}, recipientAccount: {recipient_account}")]
    RecipientAccountMismatch {
        merchant_account: String,
        recipient_account: String,
    },

    /// No edge in the transition table leads from `from` to `to`
    #[error("can't change payment state from: {from}, to: {to}, role: {role}")]
    IllegalTransition {
        from: PaymentState,
        to: PaymentState,
        role: Role,
    },

    /// Malformed or insufficient arguments
    #[error("{message}")]
    BadRequest { message: String },

    /// A key read by the transaction changed before commit
    #[error("MVCC read conflict on key {key}")]
    ReadConflict { key: String },

    /// A range scanned by the transaction changed before commit
    #[error("phantom read conflict in range starting at {start}")]
    PhantomRead { start: String },

    /// Ledger state could not be read, written or decoded
    #[error("ledger error: {message}")]
    Ledger { message: String },
}

impl ContractError {
    /// Classify the error into the contract's taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::NotInitialized => ErrorKind::NotInitialized,
            ContractError::AlreadyInitialized { .. } => ErrorKind::AlreadyInitialized,
            ContractError::MemberNotFound { .. }
            | ContractError::NotConfirmed { .. }
            | ContractError::MemberByItnNotFound { .. }
            | ContractError::BankNotFound { .. }
            | ContractError::PaymentNotFound { .. }
            | ContractError::MetaNotFound { .. } => ErrorKind::NotFound,
            ContractError::ItnLookupFailed { .. } | ContractError::UpstreamFailure { .. } => {
                ErrorKind::UpstreamFailure
            }
            ContractError::PaymentAlreadyExists { .. } => ErrorKind::AlreadyExists,
            ContractError::MerchantRequired { .. }
            | ContractError::AgentRequired { .. }
            | ContractError::MetaForbidden { .. } => ErrorKind::Forbidden,
            ContractError::RoleCannotChangeFromState { .. } => ErrorKind::RoleMismatch,
            ContractError::AgentItnMismatch { .. } | ContractError::ForeignAgentPayment { .. } => {
                ErrorKind::AgentMismatch
            }
            ContractError::ForeignBankPayment { .. } => ErrorKind::BankMismatch,
            ContractError::PayerAccountMismatch { .. }
            | ContractError::RecipientAccountMismatch { .. } => ErrorKind::AccountMismatch,
            ContractError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            ContractError::BadRequest { .. } => ErrorKind::BadRequest,
            ContractError::ReadConflict { .. } | ContractError::PhantomRead { .. } => {
                ErrorKind::Conflict
            }
            ContractError::Ledger { .. } => ErrorKind::Ledger,
        }
    }

    /// Whether this is a failed member lookup rather than a ledger fault
    ///
    /// Role classification falls through to the next candidate role on
    /// lookup failures but aborts on anything else.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            ContractError::MemberNotFound { .. }
                | ContractError::NotConfirmed { .. }
                | ContractError::UpstreamFailure { .. }
        )
    }
}

// Helper functions for creating common errors

impl ContractError {
    /// Create a BadRequest error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ContractError::BadRequest {
            message: message.into(),
        }
    }

    /// Create a Ledger error
    pub fn ledger(message: impl Into<String>) -> Self {
        ContractError::Ledger {
            message: message.into(),
        }
    }

    /// Create a MemberNotFound error
    pub fn member_not_found(id: &str) -> Self {
        ContractError::MemberNotFound { id: id.to_string() }
    }

    /// Create a PaymentNotFound error
    pub fn payment_not_found(id: &str) -> Self {
        ContractError::PaymentNotFound { id: id.to_string() }
    }

    /// Create an arity error for a router operation
    pub fn arguments_mismatch(operation: &str, expected: usize, args: &[String]) -> Self {
        ContractError::BadRequest {
            message: format!(
                "arguments count mismatch for {}: expected {}, got {:?}",
                operation, expected, args
            ),
        }
    }

    /// Create a BadRequest error for an undecodable JSON argument
    pub fn invalid_payload(what: &str, error: &serde_json::Error) -> Self {
        ContractError::BadRequest {
            message: format!("invalid {} payload: {}", what, error),
        }
    }

    /// Create a Ledger error for a stored value that no longer decodes
    pub fn corrupt_state(key: &str, error: &serde_json::Error) -> Self {
        ContractError::Ledger {
            message: format!("corrupt value under key {:?}: {}", key, error),
        }
    }
}
