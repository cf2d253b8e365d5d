//! Raw record ingestion for HealthViz.
//!
//! This crate is the input boundary of the query core: it reads the
//! row-oriented encounter file into untyped [`RawRecord`]s and reports
//! load-level failures as [`IngestError`]. It does not interpret any cell;
//! typing and cleanup belong to the normalizer.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use hv_ingest::read_raw_records;
//!
//! let records = read_raw_records(Path::new("data/healthcare_dataset.csv"))?;
//! println!("{} records", records.len());
//! ```

mod csv;
mod error;
mod record;

// === Error Types ===
pub use error::{IngestError, Result};

// === Records ===
pub use record::{EXPECTED_COLUMNS, RawRecord, missing_columns};

// === CSV Reading ===
pub use csv::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_raw_records,
    read_raw_records_from_reader, validate_encoding,
};
