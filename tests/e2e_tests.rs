//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Opens the accounts in accounts.csv
//! 2. Replays transfers.csv concurrently through the engine
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Fixture outcomes do not depend on the order in which concurrent transfers
//! complete, so each fixture is run with a single worker and with several.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_transfer_engine::{ReplayConfig, ReplayRunner, ReplaySummary};
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Replay a fixture directory and compare the output with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if a fixture file is missing, the replay fails or the output
    /// differs from expected.csv.
    fn run_test_fixture(fixture_name: &str, workers: usize) -> ReplaySummary {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let accounts_path = format!("{}/accounts.csv", fixture_dir);
        let transfers_path = format!("{}/transfers.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        for path in [&accounts_path, &transfers_path, &expected_path] {
            assert!(Path::new(path).exists(), "Fixture file not found: {}", path);
        }

        let runner = ReplayRunner::new(ReplayConfig::new(workers, Duration::from_secs(5)));
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        let summary = runner
            .run(
                Path::new(&accounts_path),
                Path::new(&transfers_path),
                &mut temp_output,
            )
            .unwrap_or_else(|e| panic!("Failed to replay transfers: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (workers: {})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, workers, actual_output, expected_output
        );

        summary
    }

    #[rstest]
    #[case::fan_in("fan_in", 9, 0, 0)]
    #[case::crossfire("crossfire", 20, 0, 0)]
    #[case::duplicate_keys("duplicate_keys", 5, 0, 0)]
    #[case::duplicate_key_drains_sender("duplicate_key_drains_sender", 3, 0, 0)]
    #[case::self_transfer("self_transfer", 1, 2, 0)]
    #[case::unknown_account("unknown_account", 1, 2, 0)]
    #[case::invalid_amount("invalid_amount", 1, 3, 1)]
    #[case::insufficient_funds("insufficient_funds", 1, 2, 0)]
    #[case::precision("precision", 3, 0, 0)]
    fn test_fixtures(
        #[case] fixture: &str,
        #[case] succeeded: usize,
        #[case] rejected: usize,
        #[case] skipped: usize,
        #[values(1, 4)] workers: usize,
    ) {
        let summary = run_test_fixture(fixture, workers);

        assert_eq!(summary.succeeded, succeeded, "succeeded for {}", fixture);
        assert_eq!(summary.rejected, rejected, "rejected for {}", fixture);
        assert_eq!(summary.skipped, skipped, "skipped for {}", fixture);
    }
}
