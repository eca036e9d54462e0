//! Transition authorization
//!
//! Two static tables gate every state change:
//!
//! - the **role guard**: which role may move a payment out of its current
//!   state. States without an entry cannot be moved through `/updateState` at
//!   all, by anyone.
//! - the **edge table**: which destination states are legal from which source
//!   states.
//!
//! `CheckFundsRequest` is the only entry state and is reached exclusively by
//! creating a payment. `TicketIssuanceTimeout` has no source and is reserved.
//! `DebitSuccess -> Refunded` and `CheckFundsInProgress -> CheckFundsFail` are
//! defined edges, but `DebitSuccess` has no guard entry, so the refund edge is
//! unreachable through the role-gated entry point.

use crate::types::{ContractError, Payment, PaymentState, Role};

/// Legal edges as `(destination, sources)`
pub const TRANSITIONS: &[(PaymentState, &[PaymentState])] = &[
    (PaymentState::CheckFundsInProgress, &[PaymentState::CheckFundsRequest]),
    (PaymentState::CheckFundsSuccess, &[PaymentState::CheckFundsInProgress]),
    (PaymentState::CheckFundsFail, &[PaymentState::CheckFundsInProgress]),
    (PaymentState::DebitRequest, &[PaymentState::CheckFundsSuccess]),
    (PaymentState::DebitInProgress, &[PaymentState::DebitRequest]),
    (PaymentState::DebitSuccess, &[PaymentState::DebitInProgress]),
    (PaymentState::DebitFail, &[PaymentState::DebitInProgress]),
    (PaymentState::TicketCanceled, &[PaymentState::DebitFail]),
    (PaymentState::TicketIssuanceTimeout, &[]),
    (PaymentState::Refunded, &[PaymentState::DebitSuccess]),
];

/// Role allowed to move a payment out of `state`, if any
pub fn required_role(state: PaymentState) -> Option<Role> {
    match state {
        PaymentState::CheckFundsRequest => Some(Role::Bank),
        PaymentState::CheckFundsInProgress => Some(Role::Bank),
        PaymentState::CheckFundsSuccess => Some(Role::Agent),
        PaymentState::DebitRequest => Some(Role::Bank),
        PaymentState::DebitInProgress => Some(Role::Bank),
        PaymentState::DebitFail => Some(Role::Agent),
        PaymentState::CheckFundsFail
        | PaymentState::DebitSuccess
        | PaymentState::TicketCanceled
        | PaymentState::TicketIssuanceTimeout
        | PaymentState::Refunded => None,
    }
}

/// Whether the edge table contains `from -> to`
pub fn is_legal(from: PaymentState, to: PaymentState) -> bool {
    TRANSITIONS
        .iter()
        .any(|(destination, sources)| *destination == to && sources.contains(&from))
}

/// Destinations reachable from `from` in one step, in table order
pub fn next_states(from: PaymentState) -> Vec<PaymentState> {
    TRANSITIONS
        .iter()
        .filter(|(_, sources)| sources.contains(&from))
        .map(|(destination, _)| *destination)
        .collect()
}

/// States with no outgoing edge
pub fn is_terminal(state: PaymentState) -> bool {
    next_states(state).is_empty()
}

/// Decide whether `role` may move `payment` to `requested`
///
/// Checks run in a fixed order and the first failure wins:
/// 1. the role guard for the payment's current state
/// 2. AGENT invokers must be the payment's payer
/// 3. BANK invokers must be the payer's bank
/// 4. the edge table
///
/// Nothing is mutated; the caller applies the new state on `Ok`.
pub fn authorize(
    payment: &Payment,
    requested: PaymentState,
    invoker_id: &str,
    role: Role,
) -> Result<(), ContractError> {
    if required_role(payment.state) != Some(role) {
        return Err(ContractError::RoleCannotChangeFromState {
            state: payment.state,
            role,
        });
    }

    if role == Role::Agent && invoker_id != payment.payer_org_id {
        return Err(ContractError::ForeignAgentPayment {
            invoker: invoker_id.to_string(),
            payer: payment.payer_org_id.clone(),
        });
    }

    if role == Role::Bank && invoker_id != payment.payer_bank_org_id {
        return Err(ContractError::ForeignBankPayment {
            invoker: invoker_id.to_string(),
            payer_bank: payment.payer_bank_org_id.clone(),
        });
    }

    if !is_legal(payment.state, requested) {
        return Err(ContractError::IllegalTransition {
            from: payment.state,
            to: requested,
            role,
        });
    }

    Ok(())
}
