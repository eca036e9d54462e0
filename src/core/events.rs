//! Audit event construction
//!
//! One event per accepted creation or transition. The event is built only
//! from the payment and member snapshots read in the same transaction, so
//! every replica derives byte-identical payloads.

use crate::core::keys;
use crate::core::store::EntityStore;
use crate::types::{ContractError, EventName, Member, Payment, PaymentState, StateChangedEvent};
use tracing::debug;

/// Event for a freshly created payment
pub fn payment_created(payment: &Payment, merchant: &Member, agent: &Member) -> StateChangedEvent {
    StateChangedEvent {
        payment_key: keys::payment_key(&payment.id),
        payment_id: payment.id.clone(),
        previous_state: None,
        current_state: payment.state,
        to: merchant.clone(),
        from: agent.clone(),
        amount: payment.amount,
        currency: payment.currency.clone(),
    }
}

/// Event for a payment about to move from its current state to `next`
pub fn state_changed(
    payment: &Payment,
    next: PaymentState,
    merchant: &Member,
    agent: &Member,
) -> StateChangedEvent {
    StateChangedEvent {
        payment_key: keys::payment_key(&payment.id),
        payment_id: payment.id.clone(),
        previous_state: Some(payment.state),
        current_state: next,
        to: merchant.clone(),
        from: agent.clone(),
        amount: payment.amount,
        currency: payment.currency.clone(),
    }
}

/// Publish an event under the name matching its kind
pub fn emit(store: &mut EntityStore<'_>, event: &StateChangedEvent) -> Result<(), ContractError> {
    let name = if event.previous_state.is_none() {
        EventName::TicketPaymentCreated
    } else {
        EventName::TicketPaymentStateChanged
    };
    debug!(
        event = %name,
        payment_id = %event.payment_id,
        state = %event.current_state,
        "emitting payment event"
    );
    store.emit(name, event)
}
