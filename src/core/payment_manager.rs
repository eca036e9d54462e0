//! Payment record management
//!
//! Creates payments, applies authorized state changes, and serves reads of
//! payments, their history and their metadata.
//!
//! Each mutating operation either passes every check and performs exactly one
//! payment write (plus at most one event), or returns an error before
//! writing anything.

use crate::core::events;
use crate::core::identity::Actors;
use crate::core::store::EntityStore;
use crate::core::transitions;
use crate::types::{
    ContractError, KeyModification, Member, Payment, PaymentCreatePayload, PaymentState, Role,
    UpdateStateRequest, SALE_PAYMENT_TYPE,
};
use std::collections::BTreeMap;
use tracing::info;

/// Create a payment on behalf of the invoking agent
///
/// The payment starts in `CheckFundsRequest`; its recipient organization and
/// bank are taken from the merchant binding.
///
/// # Errors
///
/// Returns an error if:
/// - the invoker is not an AGENT
/// - the agent's bank organization does not resolve
/// - the payment id is empty or already taken
/// - the payer or recipient tax number does not resolve
/// - the payer tax number belongs to another organization
/// - the payer or recipient account differs from the registered one
pub fn create(
    store: &mut EntityStore<'_>,
    payload: PaymentCreatePayload,
    actors: &Actors,
) -> Result<Payment, ContractError> {
    let agent = match (actors.role, actors.invoker.as_ref()) {
        (Role::Agent, Some(agent)) => agent,
        _ => {
            return Err(ContractError::AgentRequired {
                role: actors.role,
                invoker: actors.invoker_id().to_string(),
            })
        }
    };

    store
        .member(&agent.bank_organization_id)
        .map_err(|e| match e {
            e if e.is_lookup_failure() => ContractError::BankNotFound {
                bank_id: agent.bank_organization_id.clone(),
                reason: e.to_string(),
            },
            e => e,
        })?;

    validate_payload(store, &payload, agent)?;

    let merchant = &actors.merchant;
    let payment = Payment {
        id: payload.id,
        ticket_number: String::new(),
        state: PaymentState::CheckFundsRequest,
        amount: payload.amount,
        currency: payload.currency,
        international_flight: payload.international_flight,
        payment_type: SALE_PAYMENT_TYPE.to_string(),
        vat_included: payload.vat_included,
        purpose: String::new(),
        meta: BTreeMap::new(),

        payer_org_id: agent.organization_id.clone(),
        payer_bank_org_id: agent.bank_organization_id.clone(),
        payer_id: payload.payer_id,
        payer_account: payload.payer_account,
        payer_number: payload.payer_number,

        recipient_org_id: merchant.organization_id.clone(),
        recipient_bank_org_id: merchant.bank_organization_id.clone(),
        recipient_id: payload.recipient_id,
        recipient_account: payload.recipient_account,
        recipient_number: payload.recipient_number,
    };

    store.put_payment(&payment)?;
    events::emit(store, &events::payment_created(&payment, merchant, agent))?;

    info!(
        payment_id = %payment.id,
        agent = %payment.payer_org_id,
        amount = payment.amount,
        currency = %payment.currency,
        "payment created"
    );
    Ok(payment)
}

/// Cross-check a creation payload against the ledger and the registry
fn validate_payload(
    store: &EntityStore<'_>,
    payload: &PaymentCreatePayload,
    agent: &Member,
) -> Result<(), ContractError> {
    if payload.id.is_empty() {
        return Err(ContractError::bad_request("paymentId is empty"));
    }

    // advisory only: a concurrent creation of the same id is caught at commit
    if store.payment_exists(&payload.id)? {
        return Err(ContractError::PaymentAlreadyExists {
            id: payload.id.clone(),
        });
    }

    let payer = store.member_by_itn(&payload.payer_number)?;
    let recipient = store.member_by_itn(&payload.recipient_number)?;

    if agent.organization_id != payer.organization_id {
        return Err(ContractError::AgentItnMismatch {
            organization_id: payer.organization_id,
        });
    }

    if agent.requisites.settlement_account != payload.payer_account {
        return Err(ContractError::PayerAccountMismatch {
            agent_account: agent.requisites.settlement_account.clone(),
            payer_account: payload.payer_account.clone(),
        });
    }

    if recipient.requisites.settlement_account != payload.recipient_account {
        return Err(ContractError::RecipientAccountMismatch {
            merchant_account: recipient.requisites.settlement_account,
            recipient_account: payload.recipient_account.clone(),
        });
    }

    Ok(())
}

/// Check a state-change request before anything else looks at it
///
/// Runs ahead of identity resolution, so malformed requests are rejected
/// without touching roles or ownership.
pub fn validate_update(request: &UpdateStateRequest) -> Result<PaymentState, ContractError> {
    let state = request
        .state
        .ok_or_else(|| ContractError::bad_request("state is empty"))?;
    if request.payment_id.is_empty() {
        return Err(ContractError::bad_request("paymentId is empty"));
    }
    Ok(state)
}

/// Move a payment to `next` if the invoker is allowed to
///
/// The event's `from` snapshot is the payer agent resolved by the payment's
/// payer tax number at the time of the change.
pub fn update_state(
    store: &mut EntityStore<'_>,
    payment_id: &str,
    next: PaymentState,
    actors: &Actors,
) -> Result<Payment, ContractError> {
    let mut payment = get(store, payment_id)?;

    transitions::authorize(&payment, next, actors.invoker_id(), actors.role)?;

    let agent = store.member_by_itn(&payment.payer_number)?;
    let event = events::state_changed(&payment, next, &actors.merchant, &agent);

    let previous = payment.state;
    payment.state = next;
    store.put_payment(&payment)?;
    events::emit(store, &event)?;

    info!(
        payment_id = %payment.id,
        from = %previous,
        to = %next,
        role = %actors.role,
        invoker = %actors.invoker_id(),
        "payment state changed"
    );
    Ok(payment)
}

/// Fetch a payment
pub fn get(store: &EntityStore<'_>, payment_id: &str) -> Result<Payment, ContractError> {
    store
        .payment(payment_id)?
        .ok_or_else(|| ContractError::payment_not_found(payment_id))
}

/// Every recorded version of a payment, newest first as the ledger returns them
pub fn history(store: &EntityStore<'_>, payment_id: &str) -> Result<Vec<KeyModification>, ContractError> {
    store.payment_history(payment_id)
}

/// Attach an opaque metadata value to a payment
///
/// Only the merchant or the agent that created the payment may write
/// metadata. The payment's state is untouched and no event is emitted.
pub fn set_meta(
    store: &mut EntityStore<'_>,
    payment_id: &str,
    key: &str,
    value: Vec<u8>,
    actors: &Actors,
) -> Result<Payment, ContractError> {
    if key.is_empty() {
        return Err(ContractError::bad_request("meta key is empty"));
    }

    let mut payment = get(store, payment_id)?;

    let allowed = match actors.role {
        Role::Merchant => true,
        Role::Agent => actors.invoker_id() == payment.payer_org_id,
        Role::Bank | Role::Unknown => false,
    };
    if !allowed {
        return Err(ContractError::MetaForbidden { role: actors.role });
    }

    payment.meta.insert(key.to_string(), value);
    store.put_payment(&payment)?;

    info!(payment_id, meta_key = key, "payment meta updated");
    Ok(payment)
}

/// Read one metadata value of a payment
pub fn get_meta(store: &EntityStore<'_>, payment_id: &str, key: &str) -> Result<Vec<u8>, ContractError> {
    let payment = get(store, payment_id)?;
    payment
        .meta
        .get(key)
        .cloned()
        .ok_or_else(|| ContractError::MetaNotFound {
            id: payment_id.to_string(),
            key: key.to_string(),
        })
}
