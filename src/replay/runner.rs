//! Concurrent replay of a transfers file against an opened ledger
//!
//! # Pipeline
//!
//! ```text
//! accounts.csv ──> RecordReader ──> InMemoryLedger::open_account   (fatal on error)
//! transfers.csv ─> RecordReader ──> spawn(TransferEngine::execute)  (at most `workers` in flight)
//!                                        │
//!                                        └──> FuturesUnordered ──> write_accounts_csv
//! ```
//!
//! Every transfer row is an independent engine call. Rows are submitted in
//! file order but run concurrently, so the final balances only equal a
//! sequential replay when the outcome does not depend on order.

use super::config::ReplayConfig;
use crate::core::{InMemoryLedger, InMemoryTransferLog, TransferEngine};
use crate::io::{
    convert_account_record, convert_transfer_record, write_accounts_csv, AccountCsvRecord,
    RecordReader, TransferCsvRecord,
};
use crate::types::{ReplayError, TransactionId, TransferError, TransferRequest};
use futures::stream::{FuturesUnordered, StreamExt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

type ReplayEngine = TransferEngine<InMemoryLedger, InMemoryTransferLog>;
type TransferOutcome = (u64, TransferRequest, Result<TransactionId, TransferError>);

/// Counters reported after a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Accounts opened from the accounts file
    pub accounts: usize,
    /// Transfers that returned a transaction id (including idempotent repeats)
    pub succeeded: usize,
    /// Transfers the engine rejected
    pub rejected: usize,
    /// Transfer rows that could not be parsed
    pub skipped: usize,
}

/// Replays a transfers file through a `TransferEngine`
#[derive(Debug, Clone)]
pub struct ReplayRunner {
    config: ReplayConfig,
}

impl ReplayRunner {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Open the accounts, replay the transfers and write final balances
    ///
    /// # Errors
    ///
    /// Fatal errors are returned: unreadable files, a malformed or rejected
    /// accounts row, a runtime failure or an output write failure. Rejected
    /// and malformed transfer rows are logged and counted in the summary.
    pub fn run(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, ReplayError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .enable_time()
            .build()
            .map_err(|e| ReplayError::RuntimeError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(self.replay(accounts_path, transfers_path, output))
    }

    async fn replay(
        &self,
        accounts_path: &Path,
        transfers_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, ReplayError> {
        let ledger = Arc::new(InMemoryLedger::new());
        let accounts = seed_accounts(&ledger, accounts_path)?;
        info!(accounts, "Ledger seeded");

        let engine = Arc::new(TransferEngine::new(
            Arc::clone(&ledger),
            Arc::new(InMemoryTransferLog::new()),
            self.config.engine_config(),
        ));

        let mut summary = self.submit_transfers(&engine, transfers_path).await?;
        summary.accounts = accounts;

        write_accounts_csv(&ledger.all_accounts().await, output)?;

        info!(
            succeeded = summary.succeeded,
            rejected = summary.rejected,
            skipped = summary.skipped,
            "Replay finished"
        );
        Ok(summary)
    }

    async fn submit_transfers(
        &self,
        engine: &Arc<ReplayEngine>,
        transfers_path: &Path,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        let mut in_flight: FuturesUnordered<JoinHandle<TransferOutcome>> = FuturesUnordered::new();

        for row in RecordReader::<TransferCsvRecord>::open(transfers_path)? {
            let (line, request) = match parse_transfer_row(row) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "Skipping transfer row");
                    summary.skipped += 1;
                    continue;
                }
            };

            // Only finished results are kept, never one per row
            if in_flight.len() >= self.config.workers {
                if let Some(joined) = in_flight.next().await {
                    record_joined(&mut summary, joined);
                }
            }

            let engine = Arc::clone(engine);
            in_flight.push(tokio::spawn(async move {
                let outcome = engine.execute(&request).await;
                (line, request, outcome)
            }));
        }

        while let Some(joined) = in_flight.next().await {
            record_joined(&mut summary, joined);
        }

        Ok(summary)
    }
}

fn seed_accounts(ledger: &InMemoryLedger, accounts_path: &Path) -> Result<usize, ReplayError> {
    let mut opened = 0;

    for row in RecordReader::<AccountCsvRecord>::open(accounts_path)? {
        let (line, record) = row?;
        let opening = convert_account_record(record).map_err(|message| ReplayError::ParseError {
            line: Some(line),
            message,
        })?;

        let id = ledger
            .open_account(&opening.owner, &opening.account_number, opening.balance)
            .map_err(|source| ReplayError::SeedError { line, source })?;
        debug!(line, account = %id, "Opened account");
        opened += 1;
    }

    Ok(opened)
}

fn parse_transfer_row(
    row: Result<(u64, TransferCsvRecord), ReplayError>,
) -> Result<(u64, TransferRequest), ReplayError> {
    let (line, record) = row?;
    let request = convert_transfer_record(record).map_err(|message| ReplayError::ParseError {
        line: Some(line),
        message,
    })?;
    Ok((line, request))
}

fn record_joined(summary: &mut ReplaySummary, joined: Result<TransferOutcome, JoinError>) {
    match joined {
        Ok((line, request, outcome)) => record_outcome(summary, line, &request, outcome),
        Err(e) => {
            error!(error = %e, "Transfer task failed");
            summary.rejected += 1;
        }
    }
}

fn record_outcome(
    summary: &mut ReplaySummary,
    line: u64,
    request: &TransferRequest,
    outcome: Result<TransactionId, TransferError>,
) {
    match outcome {
        Ok(_) => summary.succeeded += 1,
        Err(e) => {
            warn!(
                line,
                transaction_id = %request.transaction_id,
                requester = %request.requester,
                retryable = e.is_retryable(),
                error = %e,
                "Transfer rejected"
            );
            summary.rejected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn runner() -> ReplayRunner {
        ReplayRunner::new(ReplayConfig::new(4, Duration::from_secs(5)))
    }

    #[test]
    fn test_replay_moves_funds_and_reports_summary() {
        let accounts = create_temp_csv(
            "owner,account_number,balance\nowner-a,1111,100\nowner-b,2222,0\n",
        );
        let transfers = create_temp_csv(
            "requester,to_account,amount,transaction_id\n\
             owner-a,2222,30,tx-1\n\
             owner-a,2222,30,tx-1\n\
             owner-a,2222,ten,tx-2\n\
             owner-a,9999,5,tx-3\n\
             owner-a,2222,0.5,tx-4\n",
        );

        let mut output = Vec::new();
        let summary = runner()
            .run(accounts.path(), transfers.path(), &mut output)
            .unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                accounts: 2,
                succeeded: 3,
                rejected: 1,
                skipped: 1,
            }
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,owner,account_number,balance\n1,owner-a,1111,69.5\n2,owner-b,2222,30.5\n"
        );
    }

    #[test]
    fn test_replay_with_more_rows_than_workers() {
        let accounts = create_temp_csv(
            "owner,account_number,balance\nowner-a,1111,1000\nowner-b,2222,0\n",
        );
        let mut rows = String::from("requester,to_account,amount,transaction_id\n");
        for i in 0..500 {
            rows.push_str(&format!("owner-a,2222,2,tx-{}\n", i));
        }
        let transfers = create_temp_csv(&rows);

        let mut output = Vec::new();
        let summary = ReplayRunner::new(ReplayConfig::new(2, Duration::from_secs(5)))
            .run(accounts.path(), transfers.path(), &mut output)
            .unwrap();

        assert_eq!(summary.succeeded, 500);
        assert_eq!(summary.rejected, 0);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "id,owner,account_number,balance\n1,owner-a,1111,0\n2,owner-b,2222,1000\n"
        );
    }

    #[test]
    fn test_replay_fails_on_duplicate_account_number() {
        let accounts = create_temp_csv(
            "owner,account_number,balance\nowner-a,1111,100\nowner-b,1111,0\n",
        );
        let transfers = create_temp_csv("requester,to_account,amount,transaction_id\n");

        let err = runner()
            .run(accounts.path(), transfers.path(), &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, ReplayError::SeedError { line: 3, .. }));
    }

    #[test]
    fn test_replay_fails_on_malformed_balance() {
        let accounts = create_temp_csv("owner,account_number,balance\nowner-a,1111,lots\n");
        let transfers = create_temp_csv("requester,to_account,amount,transaction_id\n");

        let err = runner()
            .run(accounts.path(), transfers.path(), &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, ReplayError::ParseError { line: Some(2), .. }));
    }

    #[test]
    fn test_replay_fails_on_missing_transfers_file() {
        let accounts = create_temp_csv("owner,account_number,balance\nowner-a,1111,1\n");

        let err = runner()
            .run(accounts.path(), Path::new("missing.csv"), &mut Vec::new())
            .unwrap_err();

        assert!(err.to_string().contains("Failed to open file"));
    }
}
