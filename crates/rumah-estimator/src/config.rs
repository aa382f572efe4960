//! Central configuration: model hyperparameters, search grids, and the
//! estimator pipeline settings. Everything serializes to JSON so runs can be
//! configured from a file and cache fingerprints can hash the exact setup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Random forest hyperparameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RfParams {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure or too small.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for RfParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

/// Gradient-boosted tree hyperparameters.
///
/// `min_leaf_size` is the split-regularization knob of the `gbdt` backend;
/// it plays the role the original search gave to the minimum-loss-reduction
/// parameter, which the backend does not expose.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GbdtParams {
    pub n_estimators: usize,
    pub max_depth: u32,
    pub learning_rate: f32,
    pub min_leaf_size: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
            min_leaf_size: 1,
        }
    }
}

/// Hyperparameters for one of the supported algorithms.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelParams {
    RandomForest(RfParams),
    GradientBoosting(GbdtParams),
}

impl ModelParams {
    pub fn algorithm(&self) -> &'static str {
        match self {
            ModelParams::RandomForest(_) => "random_forest",
            ModelParams::GradientBoosting(_) => "gradient_boosting",
        }
    }
}

/// Exhaustive search space for the random forest base model.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RfGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<usize>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for RfGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![50, 100],
            max_depth: vec![5, 10],
            min_samples_split: vec![5],
            min_samples_leaf: vec![2],
        }
    }
}

impl RfGrid {
    /// Expand the grid into every hyperparameter combination.
    pub fn expand(&self, seed: u64) -> Vec<ModelParams> {
        let mut candidates = Vec::new();
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &min_samples_leaf in &self.min_samples_leaf {
                        candidates.push(ModelParams::RandomForest(RfParams {
                            n_estimators,
                            max_depth: Some(max_depth),
                            min_samples_split,
                            min_samples_leaf,
                            seed,
                        }));
                    }
                }
            }
        }
        candidates
    }
}

/// Exhaustive search space for the gradient-boosted base model.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GbdtGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<u32>,
    pub learning_rate: Vec<f32>,
    pub min_leaf_size: Vec<usize>,
}

impl Default for GbdtGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200],
            max_depth: vec![3, 6],
            learning_rate: vec![0.1, 0.01],
            min_leaf_size: vec![1, 2],
        }
    }
}

impl GbdtGrid {
    pub fn expand(&self) -> Vec<ModelParams> {
        let mut candidates = Vec::new();
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &learning_rate in &self.learning_rate {
                    for &min_leaf_size in &self.min_leaf_size {
                        candidates.push(ModelParams::GradientBoosting(GbdtParams {
                            n_estimators,
                            max_depth,
                            learning_rate,
                            min_leaf_size,
                        }));
                    }
                }
            }
        }
        candidates
    }
}

/// Settings for the end-to-end estimator pipeline.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EstimatorConfig {
    pub cache_dir: PathBuf,
    pub test_fraction: f32,
    pub seed: u64,
    pub cv_folds: usize,
    pub rf_grid: RfGrid,
    pub gbdt_grid: GbdtGrid,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            test_fraction: 0.2,
            seed: 42,
            cv_folds: 10,
            rf_grid: RfGrid::default(),
            gbdt_grid: GbdtGrid::default(),
        }
    }
}

/// Load an [`EstimatorConfig`] from a JSON file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EstimatorConfig> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config JSON: {}", path.as_ref().display()))
}
