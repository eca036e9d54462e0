//! Audit events emitted on payment creation and state changes

use crate::types::member::Member;
use crate::types::payment::{optional_state, PaymentState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name under which an event is published on the ledger's event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventName {
    TicketPaymentCreated,
    TicketPaymentStateChanged,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::TicketPaymentCreated => "TicketPaymentCreated",
            EventName::TicketPaymentStateChanged => "TicketPaymentStateChanged",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an accepted creation or transition
///
/// Derived on every replica from the same inputs, never stored as state.
/// `previous_state` is unset (serialized as `""`) for creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangedEvent {
    pub payment_key: String,
    pub payment_id: String,
    #[serde(with = "optional_state", default)]
    pub previous_state: Option<PaymentState>,
    pub current_state: PaymentState,
    /// Merchant at emission time
    pub to: Member,
    /// Paying agent at emission time
    pub from: Member,
    pub amount: u64,
    pub currency: String,
}
