//! Diagnostic logging setup
//!
//! Logs go to stderr so that stdout carries only the account CSV. The level
//! is taken from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // Another test in this process may have installed the subscriber first.
        let _ = init_logging();
        assert!(init_logging().is_err());
    }
}
