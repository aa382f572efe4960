//! Typed dataset loading and row-aligned helpers for the estimator flow.
//!
//! A [`Dataset`] holds the fixed feature matrix and the price target. The
//! feature set is fixed by the source pipeline: the city and garage columns
//! exist in cleaned data but are excluded from the model entirely, so there
//! is no categorical encoding step.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::math::{Array1, Array2};

/// Feature columns the models are trained on, in order.
pub const FEATURE_COLUMNS: [&str; 4] = [
    "LuasTanah",
    "LuasBangunan",
    "JumlahKamarTidur",
    "JumlahKamarMandi",
];

/// Label column.
pub const TARGET_COLUMN: &str = "Harga";

/// Feature matrix plus target, row-aligned.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Array1<f32>,
    pub feature_names: Vec<String>,
}

impl Dataset {
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Read a named-column CSV into a dataset.
    ///
    /// Header lookup is case-insensitive. Blank feature cells default to
    /// zero; a blank or unparseable target value is an error.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .with_context(|| format!("Failed to open CSV file: {}", path.as_ref().display()))?;

        let headers = reader
            .headers()
            .context("Failed to read CSV header row")?
            .clone();

        let mut feature_indices = Vec::with_capacity(FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            let idx = find_column(&headers, name)
                .ok_or_else(|| anyhow!("Missing feature column '{}'", name))?;
            feature_indices.push(idx);
        }
        let target_idx = find_column(&headers, TARGET_COLUMN)
            .ok_or_else(|| anyhow!("Missing target column '{}'", TARGET_COLUMN))?;

        let mut features = Vec::new();
        let mut targets = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

            for &idx in &feature_indices {
                let cell = record.get(idx).unwrap_or_default().trim();
                if cell.is_empty() {
                    features.push(0.0);
                    continue;
                }
                let parsed = cell.parse::<f32>().with_context(|| {
                    format!(
                        "Invalid feature '{}' at row {}",
                        headers.get(idx).unwrap_or(""),
                        row_idx + 1
                    )
                })?;
                features.push(parsed);
            }

            let target = record
                .get(target_idx)
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| anyhow!("Missing target value at row {}", row_idx + 1))?
                .parse::<f32>()
                .with_context(|| format!("Invalid target at row {}", row_idx + 1))?;
            targets.push(target);
        }

        let n_samples = targets.len();
        let x = Array2::from_shape_vec((n_samples, FEATURE_COLUMNS.len()), features)
            .context("Failed to build feature matrix")?;
        let y = Array1::from_vec(targets);

        log::info!(
            "Loaded {} rows with {} features from {}",
            n_samples,
            FEATURE_COLUMNS.len(),
            path.as_ref().display()
        );

        Ok(Dataset {
            x,
            y,
            feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: self.y.select(indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Split into (train, test) with a seeded shuffle so runs are
    /// reproducible.
    pub fn train_test_split(&self, test_fraction: f32, seed: u64) -> (Dataset, Dataset) {
        let n_samples = self.nrows();
        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = (n_samples as f32 * test_fraction).round() as usize;
        let n_test = n_test.min(n_samples);
        let (test_idx, train_idx) = indices.split_at(n_test);

        (self.select(train_idx), self.select(test_idx))
    }
}

/// Reindex a user-entered feature row onto the trained feature set.
///
/// Unknown names are ignored, absent features default to zero, and the
/// result is a single-row matrix in training column order.
pub fn reindex_row(values: &HashMap<String, f32>, feature_names: &[String]) -> Array2<f32> {
    let row: Vec<f32> = feature_names
        .iter()
        .map(|name| values.get(name).copied().unwrap_or(0.0))
        .collect();
    Array2::from_shape_vec((1, feature_names.len()), row)
        .expect("reindex_row: shape is constructed to match")
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reindex_fills_missing_with_zero() {
        let names: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        let mut values = HashMap::new();
        values.insert("LuasTanah".to_string(), 1200.0);
        values.insert("JumlahKamarTidur".to_string(), 5.0);
        let row = reindex_row(&values, &names);
        assert_eq!(row.shape(), (1, 4));
        assert_eq!(row.row_slice(0), &[1200.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn split_is_deterministic_for_a_seed() {
        let x = Array2::from_shape_vec((10, 1), (0..10).map(|v| v as f32).collect()).unwrap();
        let y = Array1::from_vec((0..10).map(|v| v as f32).collect());
        let ds = Dataset {
            x,
            y,
            feature_names: vec!["f".to_string()],
        };
        let (train_a, test_a) = ds.train_test_split(0.2, 42);
        let (train_b, test_b) = ds.train_test_split(0.2, 42);
        assert_eq!(train_a.y.to_vec(), train_b.y.to_vec());
        assert_eq!(test_a.y.to_vec(), test_b.y.to_vec());
        assert_eq!(train_a.nrows(), 8);
        assert_eq!(test_a.nrows(), 2);
    }
}
