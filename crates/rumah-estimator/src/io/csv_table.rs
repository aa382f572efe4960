//! CSV reader/writer for untyped tables.
use std::path::Path;

use anyhow::{anyhow, Context, Result};

/// An untyped table as read from disk: a header row plus string cells.
///
/// The cleaning pipeline works on this representation; the estimator
/// pipeline parses a typed [`crate::data_handling::Dataset`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }
}

/// Read a CSV file into a [`RawTable`] without any type interpretation.
/// The first row is treated as the header.
pub fn read_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open CSV file: {}", path.as_ref().display()))?;

    let columns = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(RawTable { columns, rows })
}

/// Encode a table as UTF-8 CSV bytes, header row first.
pub fn write_csv_bytes(table: &RawTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .context("Failed to write CSV header")?;
    for row in &table.rows {
        writer.write_record(row).context("Failed to write CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e))
}

/// Reject anything that is not a `.csv` file before any work is done.
pub fn validate_csv_extension<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if ext.eq_ignore_ascii_case("csv") {
        Ok(())
    } else {
        Err(anyhow!(
            "Unrecognized file format '{}': expected a .csv file",
            path.display()
        ))
    }
}
