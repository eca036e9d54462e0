//! Ticket ledger replay CLI
//!
//! Replays a script of contract invocations against a fresh in-memory ledger
//! and prints one JSON report per invocation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- scenario.csv --members members.json > reports.jsonl
//! cargo run -- scenario.csv --members members.json --merchant MerchantMSP --deployer AdminMSP
//! RUST_LOG=debug cargo run -- scenario.csv --members members.json
//! ```
//!
//! Logs go to stderr; the level comes from `RUST_LOG` (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success (rejected invocations are reported, not fatal)
//! - 1: Error (missing arguments, unreadable script or members file, etc.)

use std::process;
use ticket_payments::{cli, replay};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();
    let options = args.to_replay_options();

    // Reports go to stdout
    let mut output = std::io::stdout().lock();
    if let Err(e) = replay::replay(&options, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
