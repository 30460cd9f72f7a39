//! Collaborator traits consumed by the transfer engine
//!
//! The engine never talks to a concrete store. It receives a [`LedgerStore`]
//! and a [`TransferLog`] at construction time, which lets an in-process
//! implementation and a transactional database back the same algorithm.

use crate::types::{Account, AccountId, StoreError, Transfer};
use async_trait::async_trait;

/// Account storage with exclusive, batched row locking
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lock scope returned by [`LedgerStore::lock_accounts_by_ids`]
    type Scope: LockScope;

    /// Acquire exclusive locks on every account in `ids`
    ///
    /// Issued as one batched request. Blocks until every lock is granted and
    /// is all-or-nothing: if any id has no row, fails with
    /// `StoreError::NotFound` and holds no lock.
    async fn lock_accounts_by_ids(&self, ids: &[AccountId]) -> Result<Self::Scope, StoreError>;

    /// Resolve an account number to its id without locking
    fn resolve_id_by_account_number(&self, account_number: &str) -> Result<AccountId, StoreError>;

    /// Resolve an owner reference to its account id without locking
    fn resolve_id_by_owner(&self, owner: &str) -> Result<AccountId, StoreError>;
}

/// Exclusive locks held on a set of accounts (the unit of work)
///
/// Writes made through [`LockScope::persist`] become durable only on
/// [`LockScope::commit`]. Dropping the scope without committing discards
/// them and releases every lock.
pub trait LockScope: Send {
    /// Owned copies of the locked accounts, sorted by id
    fn accounts(&self) -> Vec<Account>;

    /// Stage the mutated account for commit
    ///
    /// Fails with `StoreError::NotFound` if the account is not locked by
    /// this scope.
    fn persist(&mut self, account: Account) -> Result<(), StoreError>;

    /// Make staged writes durable and release the locks
    fn commit(self);
}

/// Idempotency ledger of completed transfers
pub trait TransferLog: Send + Sync {
    /// Non-locking existence check
    ///
    /// Racy by nature; `register` is the authoritative guard.
    fn exists(&self, transaction_id: &str) -> bool;

    /// Append a transfer record
    ///
    /// Fails with `StoreError::DuplicateKey` if the transaction id is
    /// already registered, even when the caller's `exists` check raced.
    fn register(&self, transfer: Transfer) -> Result<(), StoreError>;

    /// Look up a completed transfer
    fn find(&self, transaction_id: &str) -> Option<Transfer>;

    /// Transfers requested by `requester`, newest first
    fn history_for(&self, requester: &str) -> Vec<Transfer>;
}
