//! End-to-end estimator pipeline: load, split, fit-or-load all three models,
//! evaluate on the held-out split.

use anyhow::Result;

use crate::cache::{cache_path, fit_or_load, model_fingerprint, CacheStatus};
use crate::config::{EstimatorConfig, ModelParams, RfParams};
use crate::data_handling::Dataset;
use crate::io::validate_csv_extension;
use crate::math::Array1;
use crate::models::{build_model, BaseRegressor, Regressor};
use crate::stacking::{train_meta, StackedEnsemble, META_FEATURE_NAMES};
use crate::tuning::{grid_search_cv, r_squared, rmse};

/// How one model was obtained.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub params: ModelParams,
    pub cache: CacheStatus,
    /// Only known when the model was fitted in this run.
    pub cv_rmse: Option<f32>,
}

/// Everything the caller needs to display about a training run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub rf: ModelSummary,
    pub gbdt: ModelSummary,
    pub meta_cache: CacheStatus,
    pub feature_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub test_rmse: f32,
    pub test_r2: f32,
}

/// A trained ensemble plus the run summary and held-out predictions.
pub struct TrainOutcome {
    pub ensemble: StackedEnsemble,
    pub summary: TrainingSummary,
    pub test_actual: Array1<f32>,
    pub test_predicted: Array1<f32>,
    /// First rows of the input data, formatted for display.
    pub preview: Vec<Vec<String>>,
}

/// Train (or load from cache) the full stacked ensemble from a CSV file.
///
/// The extension is validated before anything else: a non-`.csv` input halts
/// the run with a format error and no fitting happens.
pub fn train_from_csv<P: AsRef<std::path::Path>>(
    path: P,
    config: &EstimatorConfig,
) -> Result<TrainOutcome> {
    validate_csv_extension(&path)?;

    let dataset = Dataset::from_csv(&path)?;
    let preview = preview_rows(&dataset, 5);

    let (train, test) = dataset.train_test_split(config.test_fraction, config.seed);
    log::info!(
        "Split {} rows into {} train / {} test",
        dataset.nrows(),
        train.nrows(),
        test.nrows()
    );

    let rf_grid_json = serde_json::to_string(&config.rf_grid)?;
    let rf_candidates = config.rf_grid.expand(config.seed);
    let (rf, rf_summary, rf_fingerprint) =
        obtain_base("rf_model", &rf_candidates, &rf_grid_json, config, &train)?;

    let gbdt_grid_json = serde_json::to_string(&config.gbdt_grid)?;
    let gbdt_candidates = config.gbdt_grid.expand();
    let (gbdt, gbdt_summary, gbdt_fingerprint) =
        obtain_base("gbdt_model", &gbdt_candidates, &gbdt_grid_json, config, &train)?;

    // The meta fingerprint chains the base fingerprints so a refitted base
    // model invalidates the meta model too.
    let meta_spec = format!(
        "{:016x}:{:016x}:{}",
        rf_fingerprint,
        gbdt_fingerprint,
        serde_json::to_string(&RfParams::default())?
    );
    let meta_names: Vec<String> = META_FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    let meta_fingerprint =
        model_fingerprint("stacking_meta", &meta_spec, &meta_names, &train.x, &train.y);
    let meta_path = cache_path(&config.cache_dir, "meta_model", meta_fingerprint);
    let (meta, meta_cache) = fit_or_load(&meta_path, || train_meta(&rf, &gbdt, &train.x, &train.y))?;

    let ensemble = StackedEnsemble {
        rf,
        gbdt,
        meta,
        feature_names: train.feature_names.clone(),
    };

    let test_predicted = ensemble
        .predict_batch(&test.x)
        .map_err(|e| anyhow::anyhow!("evaluating the held-out split failed: {}", e))?;
    let test_rmse = rmse(&test_predicted, &test.y);
    let test_r2 = r_squared(&test_predicted, &test.y);
    log::info!("Held-out RMSE {:.2}, R2 {:.3}", test_rmse, test_r2);

    let summary = TrainingSummary {
        rf: rf_summary,
        gbdt: gbdt_summary,
        meta_cache,
        feature_names: ensemble.feature_names.clone(),
        n_train: train.nrows(),
        n_test: test.nrows(),
        test_rmse,
        test_r2,
    };

    Ok(TrainOutcome {
        ensemble,
        summary,
        test_actual: test.y,
        test_predicted,
        preview,
    })
}

/// Grid-search, fit, and cache one base model (or load it straight back).
fn obtain_base(
    name: &str,
    candidates: &[ModelParams],
    grid_json: &str,
    config: &EstimatorConfig,
    train: &Dataset,
) -> Result<(BaseRegressor, ModelSummary, u64)> {
    let fingerprint = model_fingerprint(name, grid_json, &train.feature_names, &train.x, &train.y);
    let path = cache_path(&config.cache_dir, name, fingerprint);

    let mut cv_rmse = None;
    let (model, cache) = fit_or_load(&path, || {
        let outcome = grid_search_cv(candidates, &train.x, &train.y, config.cv_folds)?;
        cv_rmse = Some(outcome.cv_rmse);
        let mut model = build_model(&outcome.best);
        model.fit(&train.x, &train.y)?;
        Ok(model)
    })?;

    let summary = ModelSummary {
        params: model.params(),
        cache,
        cv_rmse,
    };
    Ok((model, summary, fingerprint))
}

fn preview_rows(dataset: &Dataset, limit: usize) -> Vec<Vec<String>> {
    let n = dataset.nrows().min(limit);
    (0..n)
        .map(|row| {
            let mut cells: Vec<String> = dataset
                .x
                .row_slice(row)
                .iter()
                .map(|v| v.to_string())
                .collect();
            cells.push(dataset.y[row].to_string());
            cells
        })
        .collect()
}
