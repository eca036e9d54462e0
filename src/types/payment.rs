//! Payment records and the requests that create or move them

use crate::types::encoding::base64_map;
use crate::types::member::OrganizationId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Payment type stamped on every payment created through `/create`
pub const SALE_PAYMENT_TYPE: &str = "SALE";

/// Lifecycle state of a payment
///
/// The "unset" sentinel of transition requests is not a variant: it is
/// `Option::<PaymentState>::None`, so it can never be persisted on a payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentState {
    /// Entry state, reached only through payment creation
    #[default]
    CheckFundsRequest,
    CheckFundsInProgress,
    CheckFundsSuccess,
    CheckFundsFail,
    DebitRequest,
    DebitInProgress,
    DebitSuccess,
    DebitFail,
    TicketCanceled,
    TicketIssuanceTimeout,
    Refunded,
}

impl PaymentState {
    pub const ALL: [PaymentState; 11] = [
        PaymentState::CheckFundsRequest,
        PaymentState::CheckFundsInProgress,
        PaymentState::CheckFundsSuccess,
        PaymentState::CheckFundsFail,
        PaymentState::DebitRequest,
        PaymentState::DebitInProgress,
        PaymentState::DebitSuccess,
        PaymentState::DebitFail,
        PaymentState::TicketCanceled,
        PaymentState::TicketIssuanceTimeout,
        PaymentState::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::CheckFundsRequest => "CheckFundsRequest",
            PaymentState::CheckFundsInProgress => "CheckFundsInProgress",
            PaymentState::CheckFundsSuccess => "CheckFundsSuccess",
            PaymentState::CheckFundsFail => "CheckFundsFail",
            PaymentState::DebitRequest => "DebitRequest",
            PaymentState::DebitInProgress => "DebitInProgress",
            PaymentState::DebitSuccess => "DebitSuccess",
            PaymentState::DebitFail => "DebitFail",
            PaymentState::TicketCanceled => "TicketCanceled",
            PaymentState::TicketIssuanceTimeout => "TicketIssuanceTimeout",
            PaymentState::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown payment state: {}", s))
    }
}

/// `Option<PaymentState>` encoded with `""` for `None`
pub mod optional_state {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S>(state: &Option<PaymentState>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(state.map(|s| s.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<PaymentState>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

/// A payment as persisted under `PAYMENT_<id>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "paymentId")]
    pub id: String,

    #[serde(default)]
    pub ticket_number: String,

    pub state: PaymentState,

    pub amount: u64,

    pub currency: String,

    #[serde(rename = "internationalFlight")]
    pub international_flight: bool,

    #[serde(rename = "paymentType")]
    pub payment_type: String,

    #[serde(rename = "vat", default)]
    pub vat_included: bool,

    #[serde(default)]
    pub purpose: String,

    /// Free-form metadata; ordered so serialization is deterministic
    #[serde(with = "base64_map", default)]
    pub meta: BTreeMap<String, Vec<u8>>,

    #[serde(rename = "payerOrgId")]
    pub payer_org_id: OrganizationId,

    #[serde(rename = "payerBankOrgId")]
    pub payer_bank_org_id: OrganizationId,

    #[serde(rename = "payerId")]
    pub payer_id: String,

    #[serde(rename = "payerAccount")]
    pub payer_account: String,

    /// Payer tax number
    #[serde(rename = "payerNumber")]
    pub payer_number: String,

    #[serde(rename = "recipientOrgId")]
    pub recipient_org_id: OrganizationId,

    #[serde(rename = "recipientBankOrgId")]
    pub recipient_bank_org_id: OrganizationId,

    #[serde(rename = "recipientId")]
    pub recipient_id: String,

    #[serde(rename = "recipientAccount")]
    pub recipient_account: String,

    /// Recipient tax number
    #[serde(rename = "recipientNumber")]
    pub recipient_number: String,
}

/// Body of `/create`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCreatePayload {
    #[serde(rename = "paymentId")]
    pub id: String,

    #[serde(default)]
    pub agent_id: String,

    pub amount: u64,

    #[serde(default)]
    pub currency: String,

    #[serde(rename = "internationalFlight", default)]
    pub international_flight: bool,

    #[serde(rename = "paymentType", default)]
    pub payment_type: String,

    #[serde(rename = "payerId", default)]
    pub payer_id: String,

    #[serde(rename = "payerAccount", default)]
    pub payer_account: String,

    #[serde(rename = "payerNumber", default)]
    pub payer_number: String,

    #[serde(rename = "recipientId", default)]
    pub recipient_id: String,

    #[serde(rename = "recipientAccount", default)]
    pub recipient_account: String,

    #[serde(rename = "recipientNumber", default)]
    pub recipient_number: String,

    #[serde(rename = "vat", default)]
    pub vat_included: bool,
}

/// Body of `/updateState`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStateRequest {
    #[serde(default)]
    pub payment_id: String,

    #[serde(with = "optional_state", default)]
    pub state: Option<PaymentState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_state_names_round_trip_through_from_str() {
        for state in PaymentState::ALL {
            assert_eq!(state.as_str().parse::<PaymentState>(), Ok(state));
        }
        assert!("Issued".parse::<PaymentState>().is_err());
    }

    #[rstest]
    #[case::empty(r#"{"payment_id":"p-1","state":""}"#, None)]
    #[case::missing(r#"{"payment_id":"p-1"}"#, None)]
    #[case::null(r#"{"payment_id":"p-1","state":null}"#, None)]
    #[case::set(
        r#"{"payment_id":"p-1","state":"DebitRequest"}"#,
        Some(PaymentState::DebitRequest)
    )]
    fn test_update_state_request_decoding(
        #[case] json: &str,
        #[case] expected: Option<PaymentState>,
    ) {
        let request: UpdateStateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.payment_id, "p-1");
        assert_eq!(request.state, expected);
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let result: Result<UpdateStateRequest, _> =
            serde_json::from_str(r#"{"payment_id":"p-1","state":"Issued"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_payment_uses_wire_field_names() {
        let payment = Payment {
            id: "p-1".to_string(),
            amount: 1500,
            currency: "RUB".to_string(),
            payment_type: SALE_PAYMENT_TYPE.to_string(),
            payer_org_id: "AgentMSP".to_string(),
            ..Payment::default()
        };
        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["paymentId"], "p-1");
        assert_eq!(value["state"], "CheckFundsRequest");
        assert_eq!(value["paymentType"], "SALE");
        assert_eq!(value["payerOrgId"], "AgentMSP");
        assert_eq!(value["meta"], serde_json::json!({}));
    }
}
