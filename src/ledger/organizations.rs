//! In-memory organizations registry
//!
//! Stands in for the platform's `organizations` contract: it owns member
//! records and answers the two read-only queries the ticket contract makes.
//!
//! - `/get <organizationId>`
//! - `/member/byITN <itn>`
//!
//! A missing member is answered with an OK response and an empty payload,
//! the way the platform contract does it.

use crate::core::traits::PeerContract;
use crate::types::{Member, OrganizationId, Response};
use dashmap::DashMap;
use tracing::debug;

const GET_FUNCTION: &str = "/get";
const BY_ITN_FUNCTION: &str = "/member/byITN";

/// Member records indexed by organization id and by tax number
#[derive(Debug, Default)]
pub struct OrganizationsRegistry {
    members: DashMap<OrganizationId, Member>,

    /// Tax number to organization id
    itn_index: DashMap<String, OrganizationId>,
}

impl OrganizationsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a member
    pub fn register(&self, member: Member) {
        debug!(organization_id = %member.organization_id, "registering member");
        if !member.requisites.itn.is_empty() {
            self.itn_index
                .insert(member.requisites.itn.clone(), member.organization_id.clone());
        }
        self.members.insert(member.organization_id.clone(), member);
    }

    /// Mark a member as confirmed by its bank
    ///
    /// Returns `false` if the member is unknown.
    pub fn confirm(&self, organization_id: &str) -> bool {
        self.set_confirmed(organization_id, true)
    }

    /// Withdraw a member's bank confirmation
    pub fn revoke(&self, organization_id: &str) -> bool {
        self.set_confirmed(organization_id, false)
    }

    fn set_confirmed(&self, organization_id: &str, confirmed: bool) -> bool {
        match self.members.get_mut(organization_id) {
            Some(mut member) => {
                member.confirmed_by_bank = confirmed;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, organization_id: &str) -> Option<Member> {
        self.members.get(organization_id).map(|member| member.clone())
    }

    pub fn by_itn(&self, itn: &str) -> Option<Member> {
        let organization_id = self.itn_index.get(itn).map(|id| id.clone())?;
        self.get(&organization_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl PeerContract for OrganizationsRegistry {
    fn query(&self, args: &[String]) -> Response {
        let (function, argument) = match args {
            [function, argument] => (function.as_str(), argument.as_str()),
            _ => {
                return Response::error(format!("Arguments count mismatch: {:?}", args));
            }
        };

        let member = match function {
            GET_FUNCTION => self.get(argument),
            BY_ITN_FUNCTION => self.by_itn(argument),
            other => return Response::error(format!("unknown function: {}", other)),
        };

        match member {
            Some(member) => match serde_json::to_vec(&member) {
                Ok(payload) => Response::success(payload),
                Err(e) => Response::error(format!("cannot encode member: {}", e)),
            },
            None => Response::success(Vec::new()),
        }
    }
}
