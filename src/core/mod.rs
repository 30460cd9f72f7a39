//! Core business logic module
//!
//! This module contains the funds-transfer components:
//! - `traits` - Collaborator contracts consumed by the engine
//! - `engine` - Transfer orchestration, lock ordering and idempotency
//! - `ledger_store` - In-process account storage with per-row exclusive locks
//! - `transfer_log` - In-process idempotency ledger of completed transfers

pub mod engine;
pub mod ledger_store;
pub mod traits;
pub mod transfer_log;

pub use engine::{lock_order, EngineConfig, TransferEngine};
pub use ledger_store::{InMemoryLedger, InMemoryLockScope};
pub use traits::{LedgerStore, LockScope, TransferLog};
pub use transfer_log::InMemoryTransferLog;
