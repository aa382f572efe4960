use serde::{Deserialize, Serialize};

use crate::config::ModelParams;
use crate::error::PredictError;
use crate::math::{Array1, Array2};
use crate::models::gradient_boost::GradientBoostRegressor;
use crate::models::random_forest::RandomForestRegressor;
use crate::models::regressor::Regressor;

/// One of the supported base algorithms.
///
/// Enum dispatch instead of `Box<dyn Regressor>` keeps fitted models
/// serializable, which the on-disk cache relies on.
#[derive(Serialize, Deserialize)]
pub enum BaseRegressor {
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostRegressor),
}

impl BaseRegressor {
    /// The hyperparameters the model was built with.
    pub fn params(&self) -> ModelParams {
        match self {
            BaseRegressor::RandomForest(m) => ModelParams::RandomForest(m.params().clone()),
            BaseRegressor::GradientBoosting(m) => {
                ModelParams::GradientBoosting(m.params().clone())
            }
        }
    }
}

impl Regressor for BaseRegressor {
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> anyhow::Result<()> {
        match self {
            BaseRegressor::RandomForest(m) => m.fit(x, y),
            BaseRegressor::GradientBoosting(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>, PredictError> {
        match self {
            BaseRegressor::RandomForest(m) => m.predict(x),
            BaseRegressor::GradientBoosting(m) => m.predict(x),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BaseRegressor::RandomForest(m) => m.name(),
            BaseRegressor::GradientBoosting(m) => m.name(),
        }
    }
}

/// Build an untrained model from a `ModelParams`.
pub fn build_model(params: &ModelParams) -> BaseRegressor {
    match params {
        ModelParams::RandomForest(p) => {
            BaseRegressor::RandomForest(RandomForestRegressor::new(p.clone()))
        }
        ModelParams::GradientBoosting(p) => {
            BaseRegressor::GradientBoosting(GradientBoostRegressor::new(p.clone()))
        }
    }
}
