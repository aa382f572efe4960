//! Gradient-boosted tree regressor backed by the `gbdt` crate.
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::config::GbdtParams;
use crate::error::PredictError;
use crate::math::{Array1, Array2};
use crate::models::regressor::Regressor;

/// Gradient Boosting Decision Tree regressor with squared-error loss.
#[derive(Serialize, Deserialize)]
pub struct GradientBoostRegressor {
    params: GbdtParams,
    model: Option<GBDT>,
    n_features: usize,
}

impl GradientBoostRegressor {
    pub fn new(params: GbdtParams) -> Self {
        GradientBoostRegressor {
            params,
            model: None,
            n_features: 0,
        }
    }

    pub fn params(&self) -> &GbdtParams {
        &self.params
    }
}

impl Regressor for GradientBoostRegressor {
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> anyhow::Result<()> {
        anyhow::ensure!(x.nrows() > 0, "cannot fit gradient boosting on zero rows");
        anyhow::ensure!(
            x.nrows() == y.len(),
            "feature matrix has {} rows but target has {}",
            x.nrows(),
            y.len()
        );

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.n_estimators);
        config.set_shrinkage(self.params.learning_rate);
        config.set_min_leaf_size(self.params.min_leaf_size);
        config.set_loss("SquaredError");
        config.set_debug(false);
        config.set_training_optimization_level(2);

        let mut gbdt = GBDT::new(&config);

        let mut train_x = DataVec::new();
        for row in 0..x.nrows() {
            let train_row = x.row_slice(row).to_vec();
            train_x.push(Data::new_training_data(train_row, 1.0, y[row], None));
        }

        gbdt.fit(&mut train_x);

        self.model = Some(gbdt);
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>, PredictError> {
        let model = self.model.as_ref().ok_or(PredictError::ModelNotReady)?;
        if x.ncols() != self.n_features {
            return Err(PredictError::ShapeMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }

        let mut test_x = DataVec::new();
        for row in 0..x.nrows() {
            let test_row = x.row_slice(row).to_vec();
            test_x.push(Data::new_training_data(test_row, 1.0, 0.0, None));
        }
        Ok(model.predict(&test_x).into_iter().collect())
    }

    fn name(&self) -> &'static str {
        "gradient_boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_and_predicts_a_step_function() {
        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                1.0, 0.5, 2.0, 0.4, 3.0, 0.6, 4.0, 0.5, 5.0, 0.4, 11.0, 0.6, 12.0, 0.5, 13.0,
                0.4, 14.0, 0.6, 15.0, 0.5,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![
            10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 100.0, 100.0, 100.0, 100.0,
        ]);

        let mut model = GradientBoostRegressor::new(GbdtParams {
            n_estimators: 30,
            max_depth: 3,
            learning_rate: 0.3,
            min_leaf_size: 1,
        });
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 10);
        assert!(preds[0] < preds[9], "low group should stay below high group");
    }

    #[test]
    fn predict_before_fit_is_not_ready() {
        let model = GradientBoostRegressor::new(GbdtParams::default());
        let x = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        assert!(matches!(model.predict(&x), Err(PredictError::ModelNotReady)));
    }
}
