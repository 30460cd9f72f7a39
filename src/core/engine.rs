//! Transfer engine
//!
//! This module provides the `TransferEngine`, which moves funds between two
//! accounts by coordinating a [`LedgerStore`] and a [`TransferLog`].
//!
//! # Algorithm
//!
//! 1. Reject a non-positive amount or an empty transaction id
//! 2. Idempotency fast path: a registered transaction id returns immediately
//! 3. Resolve sender (by owner) and recipient (by account number) without locking
//! 4. Refuse a transfer whose two ids are equal
//! 5. Sort the two ids and lock them as one batch, bounded by the lock timeout
//! 6. Re-check the transaction id now that the rows are held
//! 7. Withdraw from the sender and deposit to the recipient on the locked rows
//! 8. Persist both rows and register the transfer, then commit
//!
//! Steps 5-8 form one unit of work. Any failure drops the lock scope, which
//! discards the staged balances and releases the locks.
//!
//! # Deadlock Freedom
//!
//! Every transfer touching accounts X and Y requests their locks in ascending
//! id order, whatever its direction. No two transfers can wait on each other
//! in a cycle.

use super::traits::{LedgerStore, LockScope, TransferLog};
use crate::types::{AccountId, StoreError, TransactionId, Transfer, TransferError, TransferRequest};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Engine configuration
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on the wait for both account locks
    pub lock_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Create a config with a custom lock timeout
    ///
    /// A zero timeout would fail every transfer, so it falls back to the
    /// default.
    pub fn new(lock_timeout: Duration) -> Self {
        let default = Self::default();

        let lock_timeout = if lock_timeout.is_zero() {
            warn!(
                default_ms = millis(default.lock_timeout),
                "Invalid lock_timeout (0), using default"
            );
            default.lock_timeout
        } else {
            lock_timeout
        };

        Self { lock_timeout }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Sort the two participants into lock-acquisition order
pub fn lock_order(first: AccountId, second: AccountId) -> [AccountId; 2] {
    if first <= second {
        [first, second]
    } else {
        [second, first]
    }
}

/// Transfer orchestrator
///
/// Collaborators are injected at construction. The engine holds no account
/// state of its own and can be shared across tasks behind an `Arc`.
#[derive(Debug)]
pub struct TransferEngine<L, T> {
    ledger: Arc<L>,
    transfer_log: Arc<T>,
    config: EngineConfig,
}

impl<L, T> TransferEngine<L, T>
where
    L: LedgerStore,
    T: TransferLog,
{
    /// Create an engine over the given ledger store and transfer log
    pub fn new(ledger: Arc<L>, transfer_log: Arc<T>, config: EngineConfig) -> Self {
        Self {
            ledger,
            transfer_log,
            config,
        }
    }

    /// Ledger store used by this engine
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Transfer log used by this engine
    pub fn transfer_log(&self) -> &Arc<T> {
        &self.transfer_log
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Move `amount` from the requester's account to `to_account_number`
    ///
    /// Returns the transaction id. Calling again with an id that already
    /// completed returns the same id without touching any balance.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0` (no lookup, no lock)
    /// - `InvalidTransactionId` if `transaction_id` is empty
    /// - `AccountNotFound` if either participant cannot be resolved or locked
    /// - `InvalidTransfer` if both participants are the same account
    /// - `InsufficientFunds` if the locked sender balance is below `amount`
    /// - `LockTimeout` if the locks were not granted in time (retryable)
    pub async fn transfer(
        &self,
        requester: &str,
        to_account_number: &str,
        amount: Decimal,
        transaction_id: &str,
    ) -> Result<TransactionId, TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::invalid_amount(amount));
        }
        if transaction_id.is_empty() {
            return Err(TransferError::InvalidTransactionId);
        }

        debug!(transaction_id, requester, to_account_number, %amount, "Transfer start");

        if self.transfer_log.exists(transaction_id) {
            info!(transaction_id, "Transfer already processed");
            return Ok(transaction_id.to_string());
        }

        let from_id = self.ledger.resolve_id_by_owner(requester)?;
        let to_id = self.ledger.resolve_id_by_account_number(to_account_number)?;

        if from_id == to_id {
            return Err(TransferError::invalid_transfer(
                "sender and recipient must differ",
            ));
        }

        let order = lock_order(from_id, to_id);
        debug!(transaction_id, first = %order[0], second = %order[1], "Account lock order");

        let mut scope = match tokio::time::timeout(
            self.config.lock_timeout,
            self.ledger.lock_accounts_by_ids(&order),
        )
        .await
        {
            Ok(scope) => scope?,
            Err(_) => {
                let waited_ms = millis(self.config.lock_timeout);
                warn!(transaction_id, waited_ms, "Account lock wait timed out");
                return Err(TransferError::lock_timeout(waited_ms));
            }
        };

        // A same-key winner registers before it releases the shared rows
        if self.transfer_log.exists(transaction_id) {
            drop(scope);
            info!(transaction_id, "Transfer already processed by a concurrent request");
            return Ok(transaction_id.to_string());
        }

        let locked = scope.accounts();
        if locked.len() != order.len() {
            return Err(TransferError::account_not_found(&format!(
                "{} or {}",
                order[0], order[1]
            )));
        }

        // Match by id, never by position
        let mut sender = locked
            .iter()
            .find(|account| account.id == from_id)
            .cloned()
            .ok_or_else(|| TransferError::account_not_found(requester))?;
        let mut recipient = locked
            .iter()
            .find(|account| account.id == to_id)
            .cloned()
            .ok_or_else(|| TransferError::account_not_found(to_account_number))?;

        debug!(
            transaction_id,
            from = %sender.account_number,
            balance = %sender.balance(),
            to = %recipient.account_number,
            %amount,
            "Transfer processing"
        );

        sender.withdraw(amount)?;
        recipient.deposit(amount)?;

        let transfer = Transfer {
            transaction_id: transaction_id.to_string(),
            requester: requester.to_string(),
            from_account_number: sender.account_number.clone(),
            to_account_number: recipient.account_number.clone(),
            amount,
            occurred_at: Utc::now(),
        };

        scope.persist(sender)?;
        scope.persist(recipient)?;

        match self.transfer_log.register(transfer) {
            Ok(()) => scope.commit(),
            Err(StoreError::DuplicateKey { .. }) => {
                // A concurrent request with the same key registered first;
                // dropping the scope rolls our balances back.
                drop(scope);
                info!(transaction_id, "Transfer already processed by a concurrent request");
                return Ok(transaction_id.to_string());
            }
            Err(e) => return Err(e.into()),
        }

        info!(transaction_id, %amount, "Transfer committed");
        Ok(transaction_id.to_string())
    }

    /// Execute a [`TransferRequest`]
    pub async fn execute(&self, request: &TransferRequest) -> Result<TransactionId, TransferError> {
        self.transfer(
            &request.requester,
            &request.to_account_number,
            request.amount,
            &request.transaction_id,
        )
        .await
    }

    /// Stored record of a completed transfer
    pub fn receipt(&self, transaction_id: &str) -> Option<Transfer> {
        self.transfer_log.find(transaction_id)
    }

    /// Transfers requested by `requester`, newest first
    pub fn history(&self, requester: &str) -> Vec<Transfer> {
        self.transfer_log.history_for(requester)
    }
}
