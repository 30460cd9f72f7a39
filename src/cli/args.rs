use crate::replay::ReplayConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Replay funds transfers against a set of opened accounts
#[derive(Parser, Debug)]
#[command(name = "transfer-engine")]
#[command(about = "Replay funds transfers against a set of opened accounts", long_about = None)]
pub struct CliArgs {
    /// Accounts CSV: owner,account_number,balance
    #[arg(
        long = "accounts",
        value_name = "ACCOUNTS",
        help = "Path to the accounts CSV file"
    )]
    pub accounts_file: PathBuf,

    /// Transfers CSV: requester,to_account,amount,transaction_id
    #[arg(
        long = "transfers",
        value_name = "TRANSFERS",
        help = "Path to the transfers CSV file"
    )]
    pub transfers_file: PathBuf,

    /// Worker threads and maximum transfers in flight
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of concurrent workers (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Lock wait bound per transfer in milliseconds
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Maximum wait for account locks per transfer (default: 5000)"
    )]
    pub lock_timeout_ms: Option<u64>,
}

impl CliArgs {
    /// Create a ReplayConfig from CLI arguments
    ///
    /// Missing values take the defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_replay_config(&self) -> ReplayConfig {
        if self.workers.is_none() && self.lock_timeout_ms.is_none() {
            return ReplayConfig::default();
        }

        let default = ReplayConfig::default();
        ReplayConfig::new(
            self.workers.unwrap_or(default.workers),
            self.lock_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(default.lock_timeout),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: [&str; 5] = ["program", "--accounts", "a.csv", "--transfers", "t.csv"];

    fn parse(extra: &[&str]) -> CliArgs {
        let args: Vec<&str> = BASE.iter().chain(extra.iter()).copied().collect();
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_paths_are_parsed() {
        let parsed = parse(&[]);
        assert_eq!(parsed.accounts_file, PathBuf::from("a.csv"));
        assert_eq!(parsed.transfers_file, PathBuf::from("t.csv"));
    }

    #[rstest]
    #[case::missing_transfers(&["program", "--accounts", "a.csv"])]
    #[case::missing_accounts(&["program", "--transfers", "t.csv"])]
    #[case::bad_workers(&["program", "--accounts", "a.csv", "--transfers", "t.csv", "--workers", "many"])]
    fn test_invalid_arguments_are_rejected(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[rstest]
    #[case::all_defaults(&[], num_cpus::get(), 5000)]
    #[case::custom_workers(&["--workers", "8"], 8, 5000)]
    #[case::custom_timeout(&["--lock-timeout-ms", "250"], num_cpus::get(), 250)]
    #[case::all_custom(&["--workers", "2", "--lock-timeout-ms", "100"], 2, 100)]
    #[case::zero_workers(&["--workers", "0"], num_cpus::get(), 5000)]
    #[case::zero_timeout(&["--lock-timeout-ms", "0"], num_cpus::get(), 5000)]
    fn test_replay_config_conversion(
        #[case] extra: &[&str],
        #[case] expected_workers: usize,
        #[case] expected_timeout_ms: u64,
    ) {
        let config = parse(extra).to_replay_config();

        assert_eq!(config.workers, expected_workers);
        assert_eq!(config.lock_timeout, Duration::from_millis(expected_timeout_ms));
    }
}
