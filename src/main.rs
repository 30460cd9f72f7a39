//! Rust Transfer Engine CLI
//!
//! Replays a transfers CSV against an accounts CSV and prints the final
//! account states to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv --transfers transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --transfers transfers.csv --workers 8 --lock-timeout-ms 500
//! ```
//!
//! Diagnostics go to stderr; set `RUST_LOG=debug` for per-transfer detail.
//!
//! # Exit Codes
//!
//! - 0: Success (rejected transfer rows do not change the exit code)
//! - 1: Error (missing arguments, unreadable file, bad accounts row, etc.)

use rust_transfer_engine::{cli, logging, ReplayRunner};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logging::init_logging() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let runner = ReplayRunner::new(args.to_replay_config());

    let mut output = std::io::stdout();
    if let Err(e) = runner.run(&args.accounts_file, &args.transfers_file, &mut output) {
        error!(error = %e, "Replay failed");
        process::exit(1);
    }
}
