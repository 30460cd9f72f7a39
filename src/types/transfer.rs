//! Transfer-related types for the transfer engine
//!
//! This module defines the immutable transfer record written to the transfer
//! log and the request shape accepted by the engine.

use super::account::OwnerRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Client-supplied idempotency key
pub type TransactionId = String;

/// Completed transfer record
///
/// Created exactly once per transaction id, when the unit of work commits.
/// Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Idempotency key, globally unique
    pub transaction_id: TransactionId,

    /// Owner of the debited account
    pub requester: OwnerRef,

    /// Account number of the debited account
    pub from_account_number: String,

    /// Account number of the credited account
    pub to_account_number: String,

    /// Amount moved, strictly positive
    pub amount: Decimal,

    /// Commit timestamp
    pub occurred_at: DateTime<Utc>,
}

/// Incoming transfer request
///
/// Mirrors the arguments of [`crate::core::TransferEngine::transfer`]; the
/// sender is implied by the requester identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Identity of the requesting owner
    pub requester: OwnerRef,

    /// Destination account number
    pub to_account_number: String,

    /// Amount to move
    pub amount: Decimal,

    /// Idempotency key
    pub transaction_id: TransactionId,
}
