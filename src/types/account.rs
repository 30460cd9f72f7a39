//! Account-related types for the transfer engine
//!
//! This module defines the Account structure and the balance mutations that
//! enforce its invariants. Every mutation validates before touching the
//! balance, so a failed `deposit` or `withdraw` leaves the account unchanged.

use super::error::TransferError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable internal account identifier
///
/// Totally ordered; the engine sorts by this value to decide lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to the user owning an account
pub type OwnerRef = String;

/// Account row
///
/// The balance is private: it can only change through [`Account::deposit`]
/// and [`Account::withdraw`], both of which keep it non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Internal identifier used for lock ordering
    pub id: AccountId,

    /// Owning user (exactly one account per owner)
    pub owner: OwnerRef,

    /// Externally addressable account number, unique
    pub account_number: String,

    balance: Decimal,
}

impl Account {
    /// Create an account row with an opening balance
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` if the opening balance is negative.
    pub fn open(
        id: AccountId,
        owner: impl Into<OwnerRef>,
        account_number: impl Into<String>,
        balance: Decimal,
    ) -> Result<Self, TransferError> {
        if balance < Decimal::ZERO {
            return Err(TransferError::invalid_amount(balance));
        }

        Ok(Account {
            id,
            owner: owner.into(),
            account_number: account_number.into(),
            balance,
        })
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Credit funds to the account
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `ArithmeticOverflow` if the new balance does not fit in a `Decimal`
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::invalid_amount(amount));
        }

        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::arithmetic_overflow("deposit", self.id))?;

        Ok(())
    }

    /// Debit funds from the account
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount <= 0`
    /// - `InsufficientFunds` if `balance < amount`
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), TransferError> {
        if amount <= Decimal::ZERO {
            return Err(TransferError::invalid_amount(amount));
        }

        if self.balance < amount {
            return Err(TransferError::insufficient_funds(
                self.id,
                self.balance,
                amount,
            ));
        }

        // Cannot underflow: balance >= amount > 0
        self.balance -= amount;

        Ok(())
    }
}
