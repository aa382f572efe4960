//! Integration tests for the model cache and the grid search.

use rumah_estimator::cache::{cache_path, fit_or_load, model_fingerprint, CacheStatus};
use rumah_estimator::config::{ModelParams, RfGrid, RfParams};
use rumah_estimator::math::{Array1, Array2};
use rumah_estimator::models::random_forest::RandomForestRegressor;
use rumah_estimator::models::Regressor;
use rumah_estimator::tuning::grid_search_cv;

fn toy_data(n: usize) -> (Array2<f32>, Array1<f32>) {
    let x = Array2::from_shape_vec(
        (n, 2),
        (0..n).flat_map(|i| vec![i as f32, (i % 5) as f32]).collect(),
    )
    .unwrap();
    let y = Array1::from_vec((0..n).map(|i| 3.0 * i as f32 + 10.0).collect());
    (x, y)
}

fn small_params() -> RfParams {
    RfParams {
        n_estimators: 10,
        max_depth: Some(4),
        min_samples_split: 2,
        min_samples_leaf: 1,
        seed: 42,
    }
}

// ---------------------------------------------------------------------------
// Cache round trip
// ---------------------------------------------------------------------------

#[test]
fn cached_model_predicts_identically_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (x, y) = toy_data(20);
    let path = dir.path().join("rf-test.json");

    let (fitted, status) = fit_or_load(&path, || {
        let mut model = RandomForestRegressor::new(small_params());
        model.fit(&x, &y)?;
        Ok(model)
    })
    .unwrap();
    assert_eq!(status, CacheStatus::Miss);
    assert!(path.exists());

    let (reloaded, status): (RandomForestRegressor, _) =
        fit_or_load(&path, || unreachable!("cache hit must not refit")).unwrap();
    assert_eq!(status, CacheStatus::Hit);

    let from_fit = fitted.predict(&x).unwrap();
    let from_cache = reloaded.predict(&x).unwrap();
    assert_eq!(from_fit.to_vec(), from_cache.to_vec());
}

#[test]
fn persisting_leaves_only_the_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let (x, y) = toy_data(12);
    let path = dir.path().join("rf-atomic.json");

    let _ = fit_or_load(&path, || {
        let mut model = RandomForestRegressor::new(small_params());
        model.fit(&x, &y)?;
        Ok(model)
    })
    .unwrap();

    // The temp file used for the atomic write must be gone after the rename.
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["rf-atomic.json".to_string()]);
}

// ---------------------------------------------------------------------------
// Fingerprinting
// ---------------------------------------------------------------------------

#[test]
fn fingerprint_changes_with_the_search_space() {
    let (x, y) = toy_data(10);
    let names = vec!["a".to_string(), "b".to_string()];

    let grid_a = serde_json::to_string(&RfGrid::default()).unwrap();
    let grid_b = serde_json::to_string(&RfGrid {
        n_estimators: vec![10],
        ..RfGrid::default()
    })
    .unwrap();

    let fp_a = model_fingerprint("rf_model", &grid_a, &names, &x, &y);
    let fp_b = model_fingerprint("rf_model", &grid_b, &names, &x, &y);
    assert_ne!(fp_a, fp_b);

    // Same inputs, same fingerprint.
    assert_eq!(fp_a, model_fingerprint("rf_model", &grid_a, &names, &x, &y));
}

#[test]
fn fingerprint_changes_with_the_training_data() {
    let (x, y) = toy_data(10);
    let (x2, mut y2) = toy_data(10);
    y2[0] += 1.0;
    let names = vec!["a".to_string(), "b".to_string()];
    let grid = serde_json::to_string(&RfGrid::default()).unwrap();

    assert_ne!(
        model_fingerprint("rf_model", &grid, &names, &x, &y),
        model_fingerprint("rf_model", &grid, &names, &x2, &y2)
    );
}

#[test]
fn cache_paths_embed_name_and_fingerprint() {
    let path = cache_path(std::path::Path::new("cache"), "rf_model", 0xabcd);
    assert_eq!(
        path,
        std::path::PathBuf::from("cache/rf_model-000000000000abcd.json")
    );
}

// ---------------------------------------------------------------------------
// Grid search
// ---------------------------------------------------------------------------

#[test]
fn grid_search_picks_a_candidate_from_the_grid() {
    let (x, y) = toy_data(20);
    let candidates = vec![
        ModelParams::RandomForest(RfParams {
            n_estimators: 5,
            ..small_params()
        }),
        ModelParams::RandomForest(RfParams {
            n_estimators: 15,
            ..small_params()
        }),
    ];

    let outcome = grid_search_cv(&candidates, &x, &y, 5).unwrap();
    assert_eq!(outcome.candidates, 2);
    assert!(outcome.cv_rmse.is_finite());
    assert!(candidates.contains(&outcome.best));
}

#[test]
fn grid_search_rejects_too_few_rows_for_the_fold_count() {
    let (x, y) = toy_data(5);
    let candidates = vec![ModelParams::RandomForest(small_params())];
    let err = grid_search_cv(&candidates, &x, &y, 10).unwrap_err();
    assert!(err.to_string().contains("insufficient rows"));
}
