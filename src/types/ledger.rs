//! Values exchanged with the hosting ledger
//!
//! These mirror what the platform hands a contract (submitter identity,
//! key history) and what the contract hands back (response envelope,
//! published event).

use crate::types::encoding::base64_bytes;
use serde::{Deserialize, Serialize};

/// Response status for a successful invocation
pub const STATUS_OK: i32 = 200;

/// Response status for a failed invocation
pub const STATUS_ERROR: i32 = 500;

/// Identity of the transaction submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub msp_id: String,
}

impl Identity {
    pub fn new(msp_id: impl Into<String>) -> Self {
        Identity {
            msp_id: msp_id.into(),
        }
    }
}

/// Response envelope returned by every invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: i32,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Response {
            status: STATUS_OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response {
            status: STATUS_ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// One entry of a key's modification history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModification {
    pub tx_id: String,
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// Commit timestamp in seconds
    pub time: i64,
    pub is_delete: bool,
}

/// A key/value pair returned by a range scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Event published by a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    pub name: String,
    pub payload: Vec<u8>,
}
