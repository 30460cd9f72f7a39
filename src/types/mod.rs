//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account row, identifiers and balance mutations
//! - `transfer`: Transfer records and requests
//! - `error`: Error types for the engine, its collaborators and the replay tool

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, OwnerRef};
pub use error::{ReplayError, StoreError, TransferError};
pub use transfer::{TransactionId, Transfer, TransferRequest};
