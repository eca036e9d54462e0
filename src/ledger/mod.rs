//! Ledger host module
//!
//! Everything the contract needs from its environment, in memory:
//! - `memory` - Ledger with MVCC commit validation and per-transaction stubs
//! - `organizations` - Organizations registry peer contract
//! - `sandbox` - A ready-made network of both plus the deployed contract

pub mod memory;
pub mod organizations;
pub mod sandbox;

pub use memory::{Invocation, MemoryLedger, TxContext};
pub use organizations::OrganizationsRegistry;
pub use sandbox::Sandbox;
