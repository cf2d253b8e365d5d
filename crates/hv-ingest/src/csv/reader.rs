//! CSV reading of raw encounter records.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::csv::ReaderBuilder;

use crate::error::{IngestError, Result};
use crate::record::{RawRecord, missing_columns};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| IngestError::from_io(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;

    let mut buffer = [0u8; 2];
    let bytes_read = file
        .read(&mut buffer)
        .map_err(|e| IngestError::from_io(path, e))?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    // UTF-8 BOM is acceptable (stripped from the header)
    Ok(())
}

/// Reads every record of an encounter file.
///
/// The whole file is validated and read before anything is returned; a
/// failure anywhere aborts the load.
pub fn read_raw_records(path: &Path) -> Result<Vec<RawRecord>> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    read_raw_records_from_reader(file, path)
}

/// Reads records from any reader. `source` is only used for messages.
///
/// Rows may be shorter or longer than the header: missing trailing cells
/// are simply absent from the record and extra cells are ignored.
pub fn read_raw_records_from_reader<R: Read>(reader: R, source: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(|e| IngestError::CsvParse {
        path: source.to_path_buf(),
        source: e,
    })?;

    if headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: source.to_path_buf(),
        });
    }

    let columns: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(IngestError::NoHeaderDetected {
            path: source.to_path_buf(),
        });
    }

    let missing = missing_columns(&columns);
    if !missing.is_empty() {
        tracing::warn!(
            path = %source.display(),
            missing = ?missing,
            "Input is missing expected columns; affected fields will be empty"
        );
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| IngestError::CsvParse {
            path: source.to_path_buf(),
            source: e,
        })?;
        let record: RawRecord = columns
            .iter()
            .zip(row.iter())
            .filter(|(column, _)| !column.is_empty())
            .map(|(column, value)| (column.as_str(), value))
            .collect();
        records.push(record);
    }

    tracing::info!(
        path = %source.display(),
        records = records.len(),
        columns = columns.len(),
        "Read raw records"
    );

    Ok(records)
}
