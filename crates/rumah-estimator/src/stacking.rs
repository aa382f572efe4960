//! Two-level stacking: base-model predictions become the meta model's input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::RfParams;
use crate::data_handling::reindex_row;
use crate::error::PredictError;
use crate::math::{Array1, Array2};
use crate::models::random_forest::RandomForestRegressor;
use crate::models::{BaseRegressor, Regressor};

/// Column names of the derived meta-feature table, in model order.
pub const META_FEATURE_NAMES: [&str; 2] = ["PrediksiRF", "PrediksiGBDT"];

/// Run both base models over `x` and column-stack their predictions.
///
/// The output always has exactly two columns, ordered {RF, GBDT}, and one
/// row per input row. It is derived data and never persisted.
pub fn build_meta_features(
    rf: &BaseRegressor,
    gbdt: &BaseRegressor,
    x: &Array2<f32>,
) -> Result<Array2<f32>, PredictError> {
    let rf_preds = rf.predict(x)?;
    let gbdt_preds = gbdt.predict(x)?;
    Ok(Array2::from_columns(&[rf_preds, gbdt_preds]))
}

/// Fit the meta model: a default-parameter random forest over the base
/// models' predictions on the training split. No grid search at this level.
pub fn train_meta(
    rf: &BaseRegressor,
    gbdt: &BaseRegressor,
    x: &Array2<f32>,
    y: &Array1<f32>,
) -> anyhow::Result<RandomForestRegressor> {
    let meta_features = build_meta_features(rf, gbdt, x)
        .map_err(|e| anyhow::anyhow!("building meta features failed: {}", e))?;
    let mut meta = RandomForestRegressor::new(RfParams::default());
    meta.fit(&meta_features, y)?;
    Ok(meta)
}

/// The fully assembled predictor: two base models, the stacking meta model,
/// and the feature set everything was trained on.
#[derive(Serialize, Deserialize)]
pub struct StackedEnsemble {
    pub rf: BaseRegressor,
    pub gbdt: BaseRegressor,
    pub meta: RandomForestRegressor,
    pub feature_names: Vec<String>,
}

impl StackedEnsemble {
    /// Predict prices for a whole feature matrix.
    pub fn predict_batch(&self, x: &Array2<f32>) -> Result<Array1<f32>, PredictError> {
        let meta_features = build_meta_features(&self.rf, &self.gbdt, x)?;
        self.meta.predict(&meta_features)
    }

    /// Predict a single price from user-entered feature values.
    ///
    /// The row is reindexed onto the trained feature set first, with absent
    /// features defaulting to zero.
    pub fn predict_row(&self, values: &HashMap<String, f32>) -> Result<f32, PredictError> {
        let row = reindex_row(values, &self.feature_names);
        let predictions = self.predict_batch(&row)?;
        if predictions.is_empty() {
            return Err(PredictError::Unexpected(
                "meta model returned no prediction".to_string(),
            ));
        }
        Ok(predictions[0])
    }
}
