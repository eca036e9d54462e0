//! Ticket Payments Ledger Library
//! # Overview
//!
//! This library implements a ledger-resident contract that tracks airline
//! ticket payments through a regulated lifecycle, lets only specific roles
//! trigger specific transitions, and publishes an audit event for every
//! accepted change. It runs deterministically: identical invocations produce
//! identical writes and events on every replica.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Payment, Member, events, errors)
//! - [`config`] - Location of the organizations registry
//! - [`core`] - Contract logic:
//!   - [`core::identity`] - Classification of the submitter into a role
//!   - [`core::transitions`] - State machine and role guard
//!   - [`core::payment_manager`] - Payment creation, state changes and reads
//!   - [`core::agent_registry`] - Merchant-managed agent list
//!   - [`core::contract`] - Invocation router
//! - [`ledger`] - In-memory ledger host and organizations registry
//! - [`io`] - Replay script, member file and report handling
//! - [`replay`] - Script replay pipeline
//! - [`cli`] - CLI arguments parsing
//!
//! # Payment Lifecycle
//!
//! ```text
//! CheckFundsRequest -> CheckFundsInProgress -> CheckFundsSuccess -> DebitRequest
//!                                          \-> CheckFundsFail
//! DebitRequest -> DebitInProgress -> DebitSuccess -> Refunded
//!                                 \-> DebitFail -> TicketCanceled
//! ```
//!
//! Banks move funds checks and debits; the paying agent requests the debit
//! and cancels the ticket after a failed debit.
//!
//! # Roles
//!
//! - **MERCHANT**: the single organization bound at instantiation; manages agents
//! - **AGENT**: a registered, bank-confirmed organization selling tickets
//! - **BANK**: the payer's servicing bank
//! - **UNKNOWN**: anyone else; rejected by every mutating operation

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod ledger;
pub mod replay;
pub mod types;

pub use crate::config::ContractConfig;
pub use crate::core::{Chaincode, LedgerStub, Operation, PeerContract, TicketContract};
pub use crate::ledger::{Invocation, MemoryLedger, OrganizationsRegistry, Sandbox};
pub use crate::types::{
    ContractError, ErrorKind, Member, Payment, PaymentCreatePayload, PaymentState, Response, Role,
    StateChangedEvent, UpdateStateRequest,
};
