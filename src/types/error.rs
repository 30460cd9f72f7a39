//! Error types for the transfer engine
//!
//! This module defines the error types raised by the transfer core and its
//! collaborators.
//!
//! # Error Categories
//!
//! - [`TransferError`]: caller-facing outcome of a `transfer` call
//! - [`StoreError`]: failures reported by the ledger store or transfer log;
//!   translated into `TransferError` at the engine boundary
//! - [`ReplayError`]: fatal failures of the CSV replay tool (I/O, parsing, seeding)

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Caller-facing transfer error
///
/// Only `LockTimeout` is retryable as-is. The other variants describe a
/// request that will keep failing until it changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// Amount is not strictly positive
    ///
    /// Rejected before any lookup or lock.
    #[error("Invalid amount {amount}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Empty idempotency key
    #[error("Transaction id must not be empty")]
    InvalidTransactionId,

    /// Sender and recipient resolve to the same account
    #[error("Invalid transfer: {reason}")]
    InvalidTransfer {
        /// Why the transfer was refused
        reason: String,
    },

    /// A participant could not be resolved or locked
    #[error("Account not found: {reference}")]
    AccountNotFound {
        /// Owner reference, account number or id that failed to resolve
        reference: String,
    },

    /// Sender balance is below the requested amount
    ///
    /// Checked against the locked balance, never a pre-lock read.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Debited account
        account: AccountId,
        /// Balance at the time of the check
        balance: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Balance would leave the representable range
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being mutated
        account: AccountId,
    },

    /// Transaction id already registered
    ///
    /// The engine turns this into success for the caller; it is only
    /// surfaced by collaborators.
    #[error("Duplicate transaction id {transaction_id}")]
    DuplicateKey {
        /// The already-registered key
        transaction_id: String,
    },

    /// Lock acquisition exceeded the configured wait
    #[error("Timed out after {waited_ms} ms waiting for account locks")]
    LockTimeout {
        /// Configured wait bound in milliseconds
        waited_ms: u64,
    },

    /// The ledger store refused a write for a reason of its own
    #[error("Ledger store rejected the operation: {reason}")]
    StoreRejected {
        /// Store-reported reason
        reason: String,
    },
}

impl TransferError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        TransferError::InvalidAmount { amount }
    }

    /// Create an InvalidTransfer error
    pub fn invalid_transfer(reason: &str) -> Self {
        TransferError::InvalidTransfer {
            reason: reason.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(reference: &str) -> Self {
        TransferError::AccountNotFound {
            reference: reference.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Decimal, requested: Decimal) -> Self {
        TransferError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        TransferError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(waited_ms: u64) -> Self {
        TransferError::LockTimeout { waited_ms }
    }

    /// Whether retrying the identical request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::LockTimeout { .. })
    }
}

/// Collaborator error reported by a ledger store or transfer log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// No row matches the reference
    #[error("No account row for {reference}")]
    NotFound {
        /// The missing reference
        reference: String,
    },

    /// Uniqueness constraint on the transaction id was violated
    #[error("Transaction id {transaction_id} is already registered")]
    DuplicateKey {
        /// The conflicting key
        transaction_id: String,
    },

    /// The store gave up waiting for a lock
    #[error("Lock wait exceeded {waited_ms} ms")]
    LockTimeout {
        /// Time waited in milliseconds
        waited_ms: u64,
    },

    /// Account seeding conflicts with an existing row
    #[error("Account with {field} '{value}' already exists")]
    AlreadyExists {
        /// Unique column that conflicted
        field: String,
        /// Conflicting value
        value: String,
    },

    /// Account seeding rejected by the account invariants
    #[error("Rejected account: {reason}")]
    Rejected {
        /// Reason reported by the account
        reason: String,
    },
}

impl StoreError {
    /// Create a NotFound error
    pub fn not_found(reference: impl ToString) -> Self {
        StoreError::NotFound {
            reference: reference.to_string(),
        }
    }

    /// Create a DuplicateKey error
    pub fn duplicate_key(transaction_id: &str) -> Self {
        StoreError::DuplicateKey {
            transaction_id: transaction_id.to_string(),
        }
    }

    /// Create an AlreadyExists error
    pub fn already_exists(field: &str, value: &str) -> Self {
        StoreError::AlreadyExists {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

// Engine boundary translation: no raw store error reaches the caller
impl From<StoreError> for TransferError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { reference } => TransferError::AccountNotFound { reference },
            StoreError::DuplicateKey { transaction_id } => {
                TransferError::DuplicateKey { transaction_id }
            }
            StoreError::LockTimeout { waited_ms } => TransferError::LockTimeout { waited_ms },
            StoreError::AlreadyExists { field, value } => TransferError::StoreRejected {
                reason: format!("account with {} '{}' already exists", field, value),
            },
            StoreError::Rejected { reason } => TransferError::StoreRejected { reason },
        }
    }
}

/// Fatal error of the replay tool
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayError {
    /// I/O error while reading inputs or writing output
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// An account row could not be opened
    #[error("Failed to open account at line {line}: {source}")]
    SeedError {
        /// Line of the accounts file
        line: u64,
        /// Store failure
        source: StoreError,
    },

    /// Async runtime could not be started
    #[error("Runtime error: {message}")]
    RuntimeError {
        /// Description of the runtime failure
        message: String,
    },
}

// Conversion from io::Error to ReplayError
impl From<std::io::Error> for ReplayError {
    fn from(error: std::io::Error) -> Self {
        ReplayError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to ReplayError
impl From<csv::Error> for ReplayError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ReplayError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}
