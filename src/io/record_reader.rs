//! Streaming CSV reader with iterator interface
//!
//! Provides an iterator over the raw rows of a replay input file. Conversion
//! to domain types is left to the `csv_format` module so that the caller can
//! decide whether a bad row is fatal (accounts) or skipped (transfers).
//!
//! ```no_run
//! use rust_transfer_engine::io::record_reader::RecordReader;
//! use rust_transfer_engine::io::TransferCsvRecord;
//! use std::path::Path;
//!
//! let reader = RecordReader::<TransferCsvRecord>::open(Path::new("transfers.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok((line, record)) => println!("line {}: {:?}", line, record),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use crate::types::ReplayError;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Row-by-row CSV reader
///
/// Yields each deserialized row with its 1-based line number (the header is
/// line 1). Memory use is constant in the file size.
#[derive(Debug)]
pub struct RecordReader<T> {
    reader: csv::Reader<File>,
    line_num: u64,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> RecordReader<T> {
    /// Open a CSV file with a header row
    ///
    /// Fields are trimmed; rows may have fewer fields than the header.
    ///
    /// # Errors
    ///
    /// Returns `ReplayError::IoError` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|e| ReplayError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
            _record: PhantomData,
        })
    }
}

impl<T: DeserializeOwned> Iterator for RecordReader<T> {
    type Item = Result<(u64, T), ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<T>();
        let result = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(
            result
                .map(|record| (line, record))
                .map_err(|e| ReplayError::ParseError {
                    line: Some(line),
                    message: e.to_string(),
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::{AccountCsvRecord, TransferCsvRecord};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_open_fails_on_missing_file() {
        let err = RecordReader::<AccountCsvRecord>::open(Path::new("nonexistent.csv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }

    #[test]
    fn test_reads_rows_with_line_numbers() {
        let file = create_temp_csv(
            "owner,account_number,balance\nowner-a, 1111 ,1000\nowner-b,2222,0\n",
        );

        let rows: Vec<(u64, AccountCsvRecord)> = RecordReader::<AccountCsvRecord>::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, 2);
        assert_eq!(rows[0].1.account_number, "1111");
        assert_eq!(rows[1].0, 3);
        assert_eq!(rows[1].1.owner, "owner-b");
    }

    #[test]
    fn test_missing_transaction_id_defaults_to_empty() {
        let file = create_temp_csv("requester,to_account,amount,transaction_id\nowner-a,2222,10\n");

        let rows: Vec<_> = RecordReader::<TransferCsvRecord>::open(file.path())
            .unwrap()
            .collect();

        assert_eq!(rows.len(), 1);
        let (_, record) = rows[0].as_ref().unwrap();
        assert_eq!(record.transaction_id, "");
    }

    #[test]
    fn test_malformed_row_reports_line_and_continues() {
        let file = create_temp_csv("owner,account_number,balance\nowner-a\nowner-b,2222,5\n");

        let rows: Vec<_> = RecordReader::<AccountCsvRecord>::open(file.path())
            .unwrap()
            .collect();

        assert_eq!(rows.len(), 2);
        assert!(matches!(
            rows[0],
            Err(ReplayError::ParseError { line: Some(2), .. })
        ));
        assert!(rows[1].is_ok());
    }
}
