//! Spreadsheet-cleaning pipeline for the raw Jakarta Selatan listings export.
//!
//! The stages are pure functions over an owned [`RawTable`], applied in a
//! fixed order: positional rename to the canonical column names, dropping the
//! residual header row, dropping incomplete rows, then per-column type
//! coercion. Any failure halts the whole run; there is no partial recovery.

use crate::error::CleanError;
use crate::io::RawTable;

/// Canonical column names, in the positional order of the raw export.
pub const CANONICAL_COLUMNS: [&str; 7] = [
    "Harga",
    "LuasTanah",
    "LuasBangunan",
    "JumlahKamarTidur",
    "JumlahKamarMandi",
    "Garasi",
    "Kota",
];

/// Declared scalar type of a cleaned column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Float,
    Int,
    Text,
}

/// Target type per canonical column.
///
/// `Garasi` is a count in the source data but the original pipeline coerced
/// it to text; that behavior is kept as-is.
pub fn column_schema() -> [(&'static str, ColumnKind); 7] {
    [
        ("Harga", ColumnKind::Float),
        ("LuasTanah", ColumnKind::Int),
        ("LuasBangunan", ColumnKind::Int),
        ("JumlahKamarTidur", ColumnKind::Int),
        ("JumlahKamarMandi", ColumnKind::Int),
        ("Garasi", ColumnKind::Text),
        ("Kota", ColumnKind::Text),
    ]
}

/// A cell counts as missing when it is empty or whitespace-only.
pub fn is_missing(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Rename columns positionally to [`CANONICAL_COLUMNS`].
///
/// The raw export carries unlabeled columns; the count must match exactly.
pub fn rename_columns(mut table: RawTable) -> Result<RawTable, CleanError> {
    if table.ncols() != CANONICAL_COLUMNS.len() {
        return Err(CleanError::ColumnCountMismatch {
            expected: CANONICAL_COLUMNS.len(),
            found: table.ncols(),
        });
    }
    table.columns = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    Ok(table)
}

/// Drop the first data row unconditionally; the export repeats its title there.
pub fn drop_header_artifact(mut table: RawTable) -> RawTable {
    if !table.rows.is_empty() {
        table.rows.remove(0);
    }
    table
}

/// Drop every row with a missing value in any column. Row order is preserved.
pub fn drop_incomplete_rows(mut table: RawTable) -> RawTable {
    table.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
    table
}

/// Coerce each column in place according to [`column_schema`].
///
/// Coercion is idempotent: running it over already-coerced cells reproduces
/// them exactly. A value that does not parse fails the whole operation.
pub fn coerce_types(mut table: RawTable) -> Result<RawTable, CleanError> {
    let schema = column_schema();
    for (col_idx, (name, kind)) in schema.iter().enumerate() {
        for (row_idx, row) in table.rows.iter_mut().enumerate() {
            let cell = &row[col_idx];
            let coerced = coerce_value(*kind, cell).ok_or_else(|| CleanError::Conversion {
                column: name.to_string(),
                row: row_idx + 1,
                value: cell.clone(),
            })?;
            row[col_idx] = coerced;
        }
    }
    Ok(table)
}

fn coerce_value(kind: ColumnKind, cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    match kind {
        ColumnKind::Float => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v.to_string()),
        ColumnKind::Int => parse_int(trimmed).map(|v| v.to_string()),
        ColumnKind::Text => Some(cell.to_string()),
    }
}

/// Integer coercion accepts float-formatted values and truncates them,
/// matching how the source pipeline cast count columns.
fn parse_int(value: &str) -> Option<i64> {
    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }
    let v = value.parse::<f64>().ok()?;
    if v.is_finite() {
        Some(v.trunc() as i64)
    } else {
        None
    }
}

/// Run the full cleaner flow over a freshly read table.
pub fn clean_table(table: RawTable) -> Result<RawTable, CleanError> {
    let table = rename_columns(table)?;
    let table = drop_header_artifact(table);
    let table = drop_incomplete_rows(table);
    let table = coerce_types(table)?;
    log::info!("Cleaned table has {} rows", table.nrows());
    Ok(table)
}

/// Default name of the downloadable cleaned artifact.
pub const CLEAN_OUTPUT_NAME: &str = "HARGA RUMAH JAKSEL_clean.csv";
