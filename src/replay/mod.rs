//! Replay of CSV transfer files through the transfer engine
//!
//! Used by the command-line binary and by the end-to-end tests.

pub mod config;
pub mod runner;

pub use config::ReplayConfig;
pub use runner::{ReplayRunner, ReplaySummary};
