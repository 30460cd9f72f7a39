//! In-process ledger store with per-account exclusive locks
//!
//! This module provides the `InMemoryLedger` struct, an implementation of
//! [`LedgerStore`] that keeps account rows in memory and arbitrates access to
//! them with one async mutex per row.
//!
//! # Design
//!
//! Rows live in a `DashMap` keyed by [`AccountId`], each wrapped in
//! `Arc<tokio::sync::Mutex<Account>>`. Two more `DashMap`s index the rows by
//! account number and by owner; they back the non-locking id lookups.
//!
//! A lock request clones the row handles out of the map first (so no map
//! shard is held across an await), fails if any row is missing, and only then
//! waits on the row mutexes in ascending id order. The returned
//! [`InMemoryLockScope`] owns the guards; dropping it releases every lock.
//!
//! # Thread Safety
//!
//! All methods take `&self` and are safe to call from many tasks at once.
//! Index updates rely on `DashMap`'s per-shard locking, so seeding two accounts
//! with the same number or owner concurrently lets exactly one through.

use super::traits::{LedgerStore, LockScope};
use crate::types::{Account, AccountId, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

type Row = Arc<Mutex<Account>>;

/// Thread-safe in-memory account storage
#[derive(Debug)]
pub struct InMemoryLedger {
    /// Account rows by id
    rows: DashMap<AccountId, Row>,

    /// Unique index: account number -> id
    by_number: DashMap<String, AccountId>,

    /// Unique index: owner -> id
    by_owner: DashMap<String, AccountId>,

    /// Next id to hand out; ids are never reused
    next_id: AtomicU64,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            by_number: DashMap::new(),
            by_owner: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Open an account with an opening balance
    ///
    /// Assigns a fresh id. The account number and the owner must both be
    /// unused.
    ///
    /// # Errors
    ///
    /// - `StoreError::AlreadyExists` if the account number or owner is taken
    /// - `StoreError::Rejected` if the opening balance is negative
    pub fn open_account(
        &self,
        owner: &str,
        account_number: &str,
        balance: Decimal,
    ) -> Result<AccountId, StoreError> {
        let id = AccountId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let account = Account::open(id, owner, account_number, balance).map_err(|e| {
            StoreError::Rejected {
                reason: e.to_string(),
            }
        })?;

        // The row is unreachable until both index entries point at it
        self.rows.insert(id, Arc::new(Mutex::new(account)));

        if !claim(&self.by_number, account_number, id) {
            self.rows.remove(&id);
            return Err(StoreError::already_exists("account number", account_number));
        }

        if !claim(&self.by_owner, owner, id) {
            self.by_number.remove(account_number);
            self.rows.remove(&id);
            return Err(StoreError::already_exists("owner", owner));
        }

        debug!(account_id = %id, owner, account_number, %balance, "Account opened");
        Ok(id)
    }

    /// Snapshot of the account with the given number
    ///
    /// Waits for any transfer currently holding the row to finish.
    pub async fn find_by_account_number(&self, account_number: &str) -> Option<Account> {
        let id = self.resolve_id_by_account_number(account_number).ok()?;
        self.snapshot(id).await
    }

    /// Snapshot of the account owned by `owner`
    pub async fn find_by_owner(&self, owner: &str) -> Option<Account> {
        let id = self.resolve_id_by_owner(owner).ok()?;
        self.snapshot(id).await
    }

    /// Snapshots of every account, sorted by id
    pub async fn all_accounts(&self) -> Vec<Account> {
        let mut rows: Vec<(AccountId, Row)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        rows.sort_by_key(|(id, _)| *id);

        let mut accounts = Vec::with_capacity(rows.len());
        for (_, row) in rows {
            accounts.push(row.lock().await.clone());
        }
        accounts
    }

    /// Sum of all balances
    pub async fn total_balance(&self) -> Decimal {
        self.all_accounts()
            .await
            .iter()
            .map(Account::balance)
            .sum()
    }

    async fn snapshot(&self, id: AccountId) -> Option<Account> {
        let row = self.rows.get(&id).map(|entry| Arc::clone(entry.value()))?;
        let account = row.lock().await.clone();
        Some(account)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert `key -> id` unless the key is already present
fn claim(index: &DashMap<String, AccountId>, key: &str, id: AccountId) -> bool {
    let mut claimed = false;
    index.entry(key.to_string()).or_insert_with(|| {
        claimed = true;
        id
    });
    claimed
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    type Scope = InMemoryLockScope;

    async fn lock_accounts_by_ids(&self, ids: &[AccountId]) -> Result<Self::Scope, StoreError> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        // Resolve every row before waiting on any lock: all-or-nothing
        let rows = ordered
            .iter()
            .map(|id| {
                self.rows
                    .get(id)
                    .map(|entry| Arc::clone(entry.value()))
                    .ok_or_else(|| StoreError::not_found(id))
            })
            .collect::<Result<Vec<Row>, StoreError>>()?;

        let mut locked = Vec::with_capacity(rows.len());
        for row in rows {
            locked.push(LockedRow {
                guard: row.lock_owned().await,
                staged: None,
            });
        }

        Ok(InMemoryLockScope { rows: locked })
    }

    fn resolve_id_by_account_number(&self, account_number: &str) -> Result<AccountId, StoreError> {
        self.by_number
            .get(account_number)
            .map(|entry| *entry.value())
            .ok_or_else(|| StoreError::not_found(account_number))
    }

    fn resolve_id_by_owner(&self, owner: &str) -> Result<AccountId, StoreError> {
        self.by_owner
            .get(owner)
            .map(|entry| *entry.value())
            .ok_or_else(|| StoreError::not_found(owner))
    }
}

#[derive(Debug)]
struct LockedRow {
    guard: OwnedMutexGuard<Account>,
    staged: Option<Account>,
}

/// Exclusive locks on a set of `InMemoryLedger` rows
///
/// Rows are held in ascending id order. Staged writes are applied on
/// [`LockScope::commit`] and discarded on drop.
#[derive(Debug)]
pub struct InMemoryLockScope {
    rows: Vec<LockedRow>,
}

impl LockScope for InMemoryLockScope {
    fn accounts(&self) -> Vec<Account> {
        self.rows.iter().map(|row| (*row.guard).clone()).collect()
    }

    fn persist(&mut self, account: Account) -> Result<(), StoreError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.guard.id == account.id)
            .ok_or_else(|| StoreError::not_found(account.id))?;
        row.staged = Some(account);
        Ok(())
    }

    fn commit(self) {
        for mut row in self.rows {
            if let Some(account) = row.staged.take() {
                *row.guard = account;
            }
        }
    }
}
