//! Bagged regression forest.
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RfParams;
use crate::error::PredictError;
use crate::math::{Array1, Array2};
use crate::models::regressor::Regressor;
use crate::models::tree::{RegressionTree, TreeParams};

/// Random forest regressor: an average over trees fitted on bootstrap
/// samples. Each tree gets its own seed derived from the configured one, so
/// fitting is deterministic and parallelizable.
#[derive(Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: RfParams,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn new(params: RfParams) -> Self {
        RandomForestRegressor {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn params(&self) -> &RfParams {
        &self.params
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> anyhow::Result<()> {
        anyhow::ensure!(x.nrows() > 0, "cannot fit a random forest on zero rows");
        anyhow::ensure!(
            x.nrows() == y.len(),
            "feature matrix has {} rows but target has {}",
            x.nrows(),
            y.len()
        );

        let n = x.nrows();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
        };
        let seed = self.params.seed;

        self.trees = (0..self.params.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &rows, &tree_params)
            })
            .collect();
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>, PredictError> {
        if self.trees.is_empty() {
            return Err(PredictError::ModelNotReady);
        }
        if x.ncols() != self.n_features {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        let n_trees = self.trees.len() as f32;
        let predictions = (0..x.nrows())
            .map(|row| {
                let row_slice = x.row_slice(row);
                let sum: f32 = self.trees.iter().map(|t| t.predict_row(row_slice)).sum();
                sum / n_trees
            })
            .collect();
        Ok(predictions)
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_before_fit_is_not_ready() {
        let model = RandomForestRegressor::new(RfParams::default());
        let x = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        assert_eq!(model.predict(&x), Err(PredictError::ModelNotReady));
    }

    #[test]
    fn fits_a_linear_trend_roughly() {
        let x = Array2::from_shape_vec((20, 1), (0..20).map(|v| v as f32).collect()).unwrap();
        let y = Array1::from_vec((0..20).map(|v| 2.0 * v as f32).collect());
        let mut model = RandomForestRegressor::new(RfParams {
            n_estimators: 20,
            max_depth: Some(6),
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        });
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 20);
        // The middle of the range should be close to the trend.
        assert!((preds[10] - 20.0).abs() < 6.0, "pred = {}", preds[10]);
    }

    #[test]
    fn feature_count_mismatch_is_tagged() {
        let x = Array2::from_shape_vec((4, 2), vec![1.0; 8]).unwrap();
        let y = Array1::from_vec(vec![1.0; 4]);
        let mut model = RandomForestRegressor::new(RfParams {
            n_estimators: 3,
            ..RfParams::default()
        });
        model.fit(&x, &y).unwrap();
        let bad = Array2::from_shape_vec((1, 3), vec![1.0; 3]).unwrap();
        assert_eq!(
            model.predict(&bad),
            Err(PredictError::ShapeMismatch {
                expected: 2,
                found: 3
            })
        );
    }
}
