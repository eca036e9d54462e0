//! Member file loading
//!
//! The replay tool seeds the organizations registry from a JSON array of
//! member records, in the registry's own wire format.

use crate::types::Member;
use std::fs;
use std::path::Path;

/// Read members from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of members
pub fn load_members(path: &Path) -> Result<Vec<Member>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to open members file '{}': {}", path.display(), e))?;
    parse_members(&text).map_err(|e| format!("Invalid members file '{}': {}", path.display(), e))
}

/// Parse a JSON array of members
pub fn parse_members(text: &str) -> Result<Vec<Member>, String> {
    let members: Vec<Member> = serde_json::from_str(text).map_err(|e| e.to_string())?;
    if let Some(member) = members.iter().find(|m| m.organization_id.is_empty()) {
        return Err(format!("member without organization_id: {:?}", member.organization_name));
    }
    Ok(members)
}
