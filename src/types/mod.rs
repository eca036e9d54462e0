//! Types module
//!
//! Contains core data structures used throughout the contract.
//! This module organizes types into logical submodules:
//! - `member`: organizations read from the registry
//! - `payment`: payment records, states and request payloads
//! - `event`: audit events
//! - `role`: invoker roles
//! - `ledger`: values exchanged with the hosting ledger
//! - `encoding`: serde helpers for byte fields
//! - `error`: error types for the contract

pub mod encoding;
pub mod error;
pub mod event;
pub mod ledger;
pub mod member;
pub mod payment;
pub mod role;

pub use error::{ContractError, ErrorKind};
pub use event::{EventName, StateChangedEvent};
pub use ledger::{ChaincodeEvent, Identity, KeyModification, Response, StateEntry};
pub use member::{Member, OrganizationId, OrganizationType, Requisites};
pub use payment::{
    Payment, PaymentCreatePayload, PaymentState, UpdateStateRequest, SALE_PAYMENT_TYPE,
};
pub use role::Role;
