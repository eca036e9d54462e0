//! Identity resolution
//!
//! Classifies the transaction submitter as MERCHANT, AGENT, BANK or UNKNOWN.
//! Classification never fails for an unrecognised submitter: it returns
//! `Role::Unknown` and leaves rejection to the operation being invoked.

use crate::core::store::EntityStore;
use crate::types::{ContractError, Member, Role};
use tracing::debug;

/// The parties of the running invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Actors {
    /// The merchant bound to this contract
    pub merchant: Member,

    /// The submitter's member record
    ///
    /// Always present for MERCHANT, AGENT and BANK. For UNKNOWN it is a
    /// best-effort lookup without the confirmation check and may be absent.
    pub invoker: Option<Member>,

    pub role: Role,

    /// MSP id of the submitter, as reported by the ledger
    pub creator_id: String,
}

impl Actors {
    /// Organization id of the invoker, falling back to the submitter's MSP id
    pub fn invoker_id(&self) -> &str {
        self.invoker
            .as_ref()
            .map(|member| member.organization_id.as_str())
            .unwrap_or(&self.creator_id)
    }
}

/// Resolve the submitter of the running transaction
///
/// # Errors
///
/// Fails only when the merchant itself cannot be established:
/// - `NotInitialized` if no merchant is bound
/// - `MemberNotFound`, `NotConfirmed` or `UpstreamFailure` if the merchant's
///   member record cannot be fetched
///
/// Ledger faults while classifying the submitter are propagated; failed
/// member lookups just move on to the next candidate role.
pub fn resolve(store: &EntityStore<'_>) -> Result<Actors, ContractError> {
    let merchant_id = store.merchant_id()?.ok_or(ContractError::NotInitialized)?;
    let merchant = store.member(&merchant_id)?;
    let creator_id = store.creator()?.msp_id;

    if creator_id == merchant.organization_id {
        debug!(creator = %creator_id, "invoker is the merchant");
        return Ok(Actors {
            invoker: Some(merchant.clone()),
            merchant,
            role: Role::Merchant,
            creator_id,
        });
    }

    if store.is_agent(&creator_id)? {
        match store.member(&creator_id) {
            Ok(agent) => {
                debug!(creator = %creator_id, "invoker is a registered agent");
                return Ok(Actors {
                    merchant,
                    invoker: Some(agent),
                    role: Role::Agent,
                    creator_id,
                });
            }
            Err(e) if e.is_lookup_failure() => {
                debug!(creator = %creator_id, error = %e, "registered agent did not resolve");
            }
            Err(e) => return Err(e),
        }
    }

    match store.member(&creator_id) {
        Ok(member) if member.is_bank() => {
            debug!(creator = %creator_id, "invoker is a bank");
            return Ok(Actors {
                merchant,
                invoker: Some(member),
                role: Role::Bank,
                creator_id,
            });
        }
        Ok(_) => {}
        Err(e) if e.is_lookup_failure() => {}
        Err(e) => return Err(e),
    }

    let invoker = match store.lookup_member(&creator_id) {
        Ok(member) => member,
        Err(e) if e.is_lookup_failure() => None,
        Err(e) => return Err(e),
    };
    debug!(creator = %creator_id, found = invoker.is_some(), "invoker role is unknown");
    Ok(Actors {
        merchant,
        invoker,
        role: Role::Unknown,
        creator_id,
    })
}
