//! Delimited-text input/output.
pub mod csv_table;

pub use csv_table::{read_raw_table, validate_csv_extension, write_csv_bytes, RawTable};
