//! Invocation report output
//!
//! The replay tool prints one JSON object per scripted invocation, one per
//! line. Payloads that are JSON (entities, lists, events) are embedded as
//! JSON; anything else is embedded as a string.
//!
//! All functions are pure apart from the final write, for easy testing.

use crate::ledger::Invocation;
use crate::types::ChaincodeEvent;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Status label of a successful invocation
pub const STATUS_OK: &str = "OK";

/// Status label of a rejected invocation
pub const STATUS_ERROR: &str = "ERROR";

/// One line of replay output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationReport {
    /// Script line the invocation came from
    pub line: u64,
    pub tx_id: String,
    pub function: String,
    pub status: &'static str,
    pub message: String,
    pub payload: Value,
    pub event: Option<EventReport>,
}

/// Event published by a committed invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub name: String,
    pub payload: Value,
}

impl InvocationReport {
    pub fn new(line: u64, function: &str, invocation: &Invocation) -> Self {
        let response = &invocation.response;
        InvocationReport {
            line,
            tx_id: invocation.tx_id.clone(),
            function: function.to_string(),
            status: if response.is_ok() { STATUS_OK } else { STATUS_ERROR },
            message: response.message.clone(),
            payload: payload_value(&response.payload),
            event: invocation.event.as_ref().map(EventReport::from),
        }
    }
}

impl From<&ChaincodeEvent> for EventReport {
    fn from(event: &ChaincodeEvent) -> Self {
        EventReport {
            name: event.name.clone(),
            payload: payload_value(&event.payload),
        }
    }
}

/// Embed raw payload bytes in a report
///
/// Empty payloads become `null`, JSON payloads are embedded as-is and any
/// other bytes become a (lossy UTF-8) string.
pub fn payload_value(payload: &[u8]) -> Value {
    if payload.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()))
}

/// Write one report as a single JSON line
///
/// # Errors
///
/// Returns an error if the report cannot be written to `output`
pub fn write_report(report: &InvocationReport, output: &mut dyn Write) -> Result<(), String> {
    serde_json::to_writer(&mut *output, report)
        .map_err(|e| format!("Failed to write report for line {}: {}", report.line, e))?;
    writeln!(output).map_err(|e| format!("Failed to write output: {}", e))
}
