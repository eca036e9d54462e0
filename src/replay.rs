//! Script replay
//!
//! Runs a replay script against a fresh single-node network and writes one
//! report per invocation. It orchestrates:
//! - member loading (`io::members`)
//! - contract instantiation and invocations (`ledger::Sandbox`)
//! - script parsing (`io::script`) and output (`io::report`)
//!
//! # Error Handling
//!
//! Unreadable inputs and output failures are fatal. Malformed script rows are
//! logged and skipped; rejected invocations are reported and replay goes on.

use crate::config::ContractConfig;
use crate::io::{load_members, write_report, InvocationReport, ScriptReader};
use crate::ledger::{MemoryLedger, Sandbox};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything a replay needs
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub members: PathBuf,

    /// Merchant to bind; the deployer itself when absent
    pub merchant: Option<String>,

    /// Identity instantiating the contract
    pub deployer: String,

    pub config: ContractConfig,
    pub genesis_time: i64,
}

/// Counts of a finished replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Replay `options.script` and write reports to `output`
///
/// The contract instantiation is reported first, with line 0.
///
/// # Errors
///
/// Returns an error if:
/// - the members file or the script cannot be read
/// - the contract cannot be instantiated
/// - output cannot be written
pub fn replay(options: &ReplayOptions, output: &mut dyn Write) -> Result<ReplaySummary, String> {
    let members = load_members(&options.members)?;
    let reader = ScriptReader::from_path(&options.script)?;

    let sandbox = Sandbox::with_ledger(
        MemoryLedger::with_genesis_time(options.genesis_time),
        options.config.clone(),
    );
    info!(count = members.len(), "loading members");
    sandbox.register_members(members);

    let init_args: Vec<&str> = options.merchant.as_deref().into_iter().collect();
    let deployment = sandbox.deploy(&options.deployer, &init_args);
    write_report(&InvocationReport::new(0, "init", &deployment), output)?;
    if !deployment.response.is_ok() {
        return Err(format!(
            "Failed to instantiate contract: {}",
            deployment.response.message
        ));
    }

    let mut summary = ReplaySummary::default();
    for row in reader {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "skipping script row");
                summary.skipped += 1;
                continue;
            }
        };

        let args: Vec<&str> = row.args.iter().map(String::as_str).collect();
        let invocation = sandbox.invoke(&row.creator, &row.function, &args);
        if invocation.response.is_ok() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        write_report(&InvocationReport::new(row.line, &row.function, &invocation), output)?;
    }

    output
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "replay finished"
    );
    Ok(summary)
}
