//! CSV reading utilities.

mod reader;

pub use reader::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_raw_records,
    read_raw_records_from_reader, validate_encoding,
};
