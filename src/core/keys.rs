//! Ledger key layout
//!
//! - merchant binding: the plain key `MERCHANT`
//! - payments: `PAYMENT_<paymentId>`
//! - agent registry: composite keys `\u{0}AGENT\u{0}<organizationId>\u{0}`
//!
//! Composite keys use the platform encoding: a U+0000 before the object type
//! and after every component. Components must not contain U+0000 or U+10FFFF,
//! the latter being the upper bound of prefix scans.

use crate::types::ContractError;

pub const MERCHANT_KEY: &str = "MERCHANT";
pub const AGENT_OBJECT_TYPE: &str = "AGENT";
pub const PAYMENT_KEY_PREFIX: &str = "PAYMENT";

const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';
const MIN_UNICODE_RUNE: char = '\u{0}';
const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

pub fn payment_key(payment_id: &str) -> String {
    format!("{}_{}", PAYMENT_KEY_PREFIX, payment_id)
}

pub fn agent_key(organization_id: &str) -> Result<String, ContractError> {
    create_composite_key(AGENT_OBJECT_TYPE, &[organization_id])
}

/// Build a composite key from an object type and its attributes
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, ContractError> {
    validate_component(object_type)?;
    let mut key = String::new();
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(MIN_UNICODE_RUNE);
    for attribute in attributes {
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(MIN_UNICODE_RUNE);
    }
    Ok(key)
}

/// Half-open key range covering every key under a composite prefix
pub fn composite_key_range(
    object_type: &str,
    attributes: &[&str],
) -> Result<(String, String), ContractError> {
    let start = create_composite_key(object_type, attributes)?;
    let mut end = start.clone();
    end.push(MAX_UNICODE_RUNE);
    Ok((start, end))
}

fn validate_component(component: &str) -> Result<(), ContractError> {
    if component.contains(MIN_UNICODE_RUNE) || component.contains(MAX_UNICODE_RUNE) {
        return Err(ContractError::bad_request(format!(
            "composite key component {:?} contains a reserved character",
            component
        )));
    }
    Ok(())
}
