//! I/O module
//!
//! Handles CSV parsing and output for the replay tool.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `record_reader` - Streaming CSV reader with iterator interface

pub mod csv_format;
pub mod record_reader;

pub use csv_format::{
    convert_account_record, convert_transfer_record, write_accounts_csv, AccountCsvRecord,
    OpeningBalance, TransferCsvRecord,
};
pub use record_reader::RecordReader;
