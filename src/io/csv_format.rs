//! CSV format handling for replay inputs and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Raw record structures for the accounts and transfers files
//! - Conversion from raw records to domain types
//! - Account output serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Formats
//!
//! ```text
//! accounts:  owner,account_number,balance
//! transfers: requester,to_account,amount,transaction_id
//! output:    id,owner,account_number,balance
//! ```

use crate::types::{Account, ReplayError, TransferRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Row of the accounts file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountCsvRecord {
    pub owner: String,
    pub account_number: String,
    pub balance: String,
}

/// Row of the transfers file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TransferCsvRecord {
    pub requester: String,
    pub to_account: String,
    pub amount: String,
    #[serde(default)]
    pub transaction_id: String,
}

/// Account to open before replaying transfers
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningBalance {
    pub owner: String,
    pub account_number: String,
    pub balance: Decimal,
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|_| format!("Invalid {} '{}'", field, value))
}

/// Convert an accounts-file row into an opening balance
///
/// Only the number format is checked here; balance invariants are enforced
/// when the account is opened.
pub fn convert_account_record(record: AccountCsvRecord) -> Result<OpeningBalance, String> {
    if record.owner.is_empty() || record.account_number.is_empty() {
        return Err("Account row requires an owner and an account number".to_string());
    }

    Ok(OpeningBalance {
        balance: parse_decimal("balance", &record.balance)?,
        owner: record.owner,
        account_number: record.account_number,
    })
}

/// Convert a transfers-file row into a transfer request
///
/// Amount sign and empty transaction ids are left to the engine, which
/// rejects them with the caller-facing error.
pub fn convert_transfer_record(record: TransferCsvRecord) -> Result<TransferRequest, String> {
    Ok(TransferRequest {
        amount: parse_decimal("amount", &record.amount)?,
        requester: record.requester,
        to_account_number: record.to_account,
        transaction_id: record.transaction_id,
    })
}

/// Write account states to CSV format
///
/// Writes accounts with columns: id, owner, account_number, balance.
/// Accounts are sorted by id for deterministic output; balances are written
/// without trailing zeros.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), ReplayError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "owner", "account_number", "balance"])?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.id);

    for account in sorted_accounts {
        writer.write_record(&[
            account.id.to_string(),
            account.owner.clone(),
            account.account_number.clone(),
            account.balance().normalize().to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
