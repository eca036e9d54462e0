//! Agent registry
//!
//! The merchant decides which organizations act as its ticket agents. An
//! agent is registered by id only; its member record is always read live from
//! the organizations registry.

use crate::core::identity::Actors;
use crate::core::store::EntityStore;
use crate::types::{ContractError, Member, Role};
use tracing::info;

/// Register `agent_id` as an agent of the merchant
///
/// The id is stored as given; whether it resolves to a confirmed member is
/// only checked when agents are listed or act. Re-adding an existing agent
/// is accepted and leaves one registry entry.
///
/// # Errors
///
/// - `MerchantRequired` if the invoker is not the merchant
/// - `BadRequest` if `agent_id` is empty
pub fn add(store: &mut EntityStore<'_>, agent_id: &str, actors: &Actors) -> Result<(), ContractError> {
    if actors.role != Role::Merchant {
        return Err(ContractError::MerchantRequired { role: actors.role });
    }
    if agent_id.is_empty() {
        return Err(ContractError::bad_request("agent id is empty"));
    }

    store.put_agent(agent_id)?;

    info!(agent = %agent_id, "agent registered");
    Ok(())
}

/// Member records of every registered agent, in registry key order
///
/// One agent that no longer resolves fails the whole listing.
pub fn list(store: &EntityStore<'_>) -> Result<Vec<Member>, ContractError> {
    store
        .agent_ids()?
        .iter()
        .map(|id| store.member(id))
        .collect()
}
