//! Core business logic module
//!
//! This module contains the contract's components:
//! - `traits` - Seams to the hosting ledger and peer contracts
//! - `keys` - Ledger key layout
//! - `store` - Typed access to contract state and the organizations registry
//! - `identity` - Classification of the transaction submitter
//! - `transitions` - Payment state machine and its role guard
//! - `events` - Audit event construction
//! - `payment_manager` - Payment creation, state changes and reads
//! - `agent_registry` - Merchant-managed agent list
//! - `contract` - Invocation router

pub mod agent_registry;
pub mod contract;
pub mod events;
pub mod identity;
pub mod keys;
pub mod payment_manager;
pub mod store;
pub mod traits;
pub mod transitions;

pub use contract::{Operation, TicketContract};
pub use identity::Actors;
pub use store::EntityStore;
pub use traits::{Chaincode, LedgerStub, PeerContract};
