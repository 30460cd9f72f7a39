//! Rust Transfer Engine Library
//! # Overview
//!
//! This library moves funds between accounts under concurrency. Each transfer
//! is idempotent per caller-supplied transaction id and is applied
//! all-or-nothing.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transfer, errors)
//! - [`core`] - Business logic components:
//!   - [`core::ledger_store`] - Account rows with batched exclusive locking
//!   - [`core::transfer_log`] - Completed transfers keyed by transaction id
//!   - [`core::engine`] - Transfer orchestration
//! - [`io`] - CSV input and output
//! - [`replay`] - Concurrent replay of a transfers file
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - `tracing` subscriber setup
//!
//! # Transfer Flow
//!
//! 1. Reject non-positive amounts and empty transaction ids
//! 2. Return early if the transaction id is already registered
//! 3. Resolve the requester's account and the recipient account
//! 4. Reject transfers whose two sides are the same account
//! 5. Lock both rows in ascending id order, bounded by a timeout
//! 6. Withdraw, deposit, persist and register the transfer
//!
//! A registration that loses a race for its transaction id rolls the balance
//! changes back and reports success with the same id.

pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod replay;
pub mod types;

pub use core::{
    EngineConfig, InMemoryLedger, InMemoryTransferLog, LedgerStore, LockScope, TransferEngine,
    TransferLog,
};
pub use io::write_accounts_csv;
pub use replay::{ReplayConfig, ReplayRunner, ReplaySummary};
pub use types::{
    Account, AccountId, ReplayError, StoreError, TransactionId, Transfer, TransferError,
    TransferRequest,
};
