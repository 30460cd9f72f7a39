//! Thread-safe transfer log for idempotent transfers
//!
//! This module provides the `InMemoryTransferLog` struct, which records every
//! completed transfer under its transaction id.
//!
//! # Uniqueness
//!
//! Registration is a single check-and-insert on the `DashMap` entry for the
//! transaction id, performed under that entry's shard lock. Two concurrent
//! registrations of the same id therefore cannot both succeed, no matter what
//! their earlier `exists` checks observed.

use super::traits::TransferLog;
use crate::types::{StoreError, TransactionId, Transfer};
use dashmap::DashMap;

/// In-memory transfer log keyed by transaction id
#[derive(Debug)]
pub struct InMemoryTransferLog {
    records: DashMap<TransactionId, Transfer>,
}

impl InMemoryTransferLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of registered transfers
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no transfer has been registered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for InMemoryTransferLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferLog for InMemoryTransferLog {
    fn exists(&self, transaction_id: &str) -> bool {
        self.records.contains_key(transaction_id)
    }

    fn register(&self, transfer: Transfer) -> Result<(), StoreError> {
        let transaction_id = transfer.transaction_id.clone();
        let mut inserted = false;

        self.records
            .entry(transaction_id.clone())
            .or_insert_with(|| {
                inserted = true;
                transfer
            });

        if inserted {
            Ok(())
        } else {
            Err(StoreError::duplicate_key(&transaction_id))
        }
    }

    fn find(&self, transaction_id: &str) -> Option<Transfer> {
        self.records
            .get(transaction_id)
            .map(|entry| entry.value().clone())
    }

    fn history_for(&self, requester: &str) -> Vec<Transfer> {
        let mut history: Vec<Transfer> = self
            .records
            .iter()
            .filter(|entry| entry.value().requester == requester)
            .map(|entry| entry.value().clone())
            .collect();

        history.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    fn transfer(id: &str, requester: &str, minute: u32) -> Transfer {
        Transfer {
            transaction_id: id.to_string(),
            requester: requester.to_string(),
            from_account_number: "1111".to_string(),
            to_account_number: "2222".to_string(),
            amount: Decimal::TEN,
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_register_then_exists_and_find() {
        let log = InMemoryTransferLog::new();
        assert!(!log.exists("tx-1"));

        log.register(transfer("tx-1", "owner-a", 0)).unwrap();

        assert!(log.exists("tx-1"));
        assert_eq!(log.find("tx-1").unwrap().amount, Decimal::TEN);
        assert!(log.find("tx-2").is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_register_duplicate_keeps_first_record() {
        let log = InMemoryTransferLog::new();
        log.register(transfer("tx-1", "owner-a", 0)).unwrap();

        let mut second = transfer("tx-1", "owner-b", 5);
        second.amount = Decimal::ONE;
        let err = log.register(second).unwrap_err();

        assert_eq!(err, StoreError::duplicate_key("tx-1"));
        let stored = log.find("tx-1").unwrap();
        assert_eq!(stored.requester, "owner-a");
        assert_eq!(stored.amount, Decimal::TEN);
    }

    #[test]
    fn test_concurrent_register_same_key_admits_one() {
        let log = Arc::new(InMemoryTransferLog::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let log = Arc::clone(&log);
                thread::spawn(move || log.register(transfer("tx-race", "owner-a", i)).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_history_for_is_newest_first_and_filtered() {
        let log = InMemoryTransferLog::new();
        log.register(transfer("tx-1", "owner-a", 0)).unwrap();
        log.register(transfer("tx-2", "owner-b", 1)).unwrap();
        log.register(transfer("tx-3", "owner-a", 2)).unwrap();

        let mut late = transfer("tx-4", "owner-a", 0);
        late.occurred_at = late.occurred_at + Duration::hours(1);
        log.register(late).unwrap();

        let ids: Vec<String> = log
            .history_for("owner-a")
            .into_iter()
            .map(|t| t.transaction_id)
            .collect();

        assert_eq!(ids, vec!["tx-4", "tx-3", "tx-1"]);
        assert!(log.history_for("owner-z").is_empty());
    }
}
