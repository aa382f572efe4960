//! End-to-end tests: CSV in, trained stacked ensemble out.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use rumah_estimator::cache::CacheStatus;
use rumah_estimator::config::{EstimatorConfig, GbdtGrid, RfGrid};
use rumah_estimator::data_handling::Dataset;
use rumah_estimator::pipeline::train_from_csv;
use rumah_estimator::stacking::build_meta_features;

/// Thirty listings with a simple linear price structure, enough for a
/// 3-fold search to converge on something sensible.
fn write_listing_csv(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(
        file,
        "Harga,LuasTanah,LuasBangunan,JumlahKamarTidur,JumlahKamarMandi,Garasi,Kota"
    )
    .unwrap();
    for i in 0..30u32 {
        let land = 100 + 40 * i;
        let building = 80 + 30 * i;
        let price = 1_000_000_000u64 + 2_000_000 * land as u64 + 1_500_000 * building as u64;
        writeln!(
            file,
            "{},{},{},{},{},{},Jakarta Selatan",
            price,
            land,
            building,
            2 + i % 6,
            1 + i % 4,
            i % 3
        )
        .unwrap();
    }
}

/// Tiny search spaces keep the tests fast without changing the code path.
fn fast_config(cache_dir: &Path) -> EstimatorConfig {
    EstimatorConfig {
        cache_dir: cache_dir.to_path_buf(),
        test_fraction: 0.2,
        seed: 42,
        cv_folds: 3,
        rf_grid: RfGrid {
            n_estimators: vec![10],
            max_depth: vec![5],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        },
        gbdt_grid: GbdtGrid {
            n_estimators: vec![20],
            max_depth: vec![3],
            learning_rate: vec![0.1],
            min_leaf_size: vec![1],
        },
    }
}

#[test]
fn training_run_produces_a_usable_ensemble() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listings.csv");
    write_listing_csv(&csv);

    let config = fast_config(&dir.path().join("cache"));
    let outcome = train_from_csv(&csv, &config).unwrap();

    assert_eq!(outcome.summary.n_train + outcome.summary.n_test, 30);
    assert_eq!(outcome.summary.n_test, 6);
    assert!(outcome.summary.test_rmse.is_finite());
    assert_eq!(outcome.test_actual.len(), outcome.test_predicted.len());
    assert_eq!(outcome.preview.len(), 5);

    // A fresh cache directory means every model was fitted this run.
    assert_eq!(outcome.summary.rf.cache, CacheStatus::Miss);
    assert_eq!(outcome.summary.gbdt.cache, CacheStatus::Miss);
    assert_eq!(outcome.summary.meta_cache, CacheStatus::Miss);
    assert!(outcome.summary.rf.cv_rmse.is_some());
}

#[test]
fn second_run_hits_the_cache_and_predicts_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listings.csv");
    write_listing_csv(&csv);
    let config = fast_config(&dir.path().join("cache"));

    let first = train_from_csv(&csv, &config).unwrap();
    let second = train_from_csv(&csv, &config).unwrap();

    assert_eq!(second.summary.rf.cache, CacheStatus::Hit);
    assert_eq!(second.summary.gbdt.cache, CacheStatus::Hit);
    assert_eq!(second.summary.meta_cache, CacheStatus::Hit);
    // Cached models carry no fresh cross-validation score.
    assert!(second.summary.rf.cv_rmse.is_none());

    assert_eq!(
        first.test_predicted.to_vec(),
        second.test_predicted.to_vec()
    );
}

#[test]
fn meta_features_are_one_column_per_base_model() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listings.csv");
    write_listing_csv(&csv);
    let config = fast_config(&dir.path().join("cache"));

    let outcome = train_from_csv(&csv, &config).unwrap();
    let dataset = Dataset::from_csv(&csv).unwrap();

    let meta = build_meta_features(
        &outcome.ensemble.rf,
        &outcome.ensemble.gbdt,
        &dataset.x,
    )
    .unwrap();
    assert_eq!(meta.shape(), (dataset.nrows(), 2));
}

#[test]
fn single_row_prediction_is_finite_and_positive() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listings.csv");
    write_listing_csv(&csv);
    let config = fast_config(&dir.path().join("cache"));

    let outcome = train_from_csv(&csv, &config).unwrap();

    let mut row = HashMap::new();
    row.insert("LuasTanah".to_string(), 500.0);
    row.insert("LuasBangunan".to_string(), 380.0);
    row.insert("JumlahKamarTidur".to_string(), 4.0);
    row.insert("JumlahKamarMandi".to_string(), 2.0);
    let price = outcome.ensemble.predict_row(&row).unwrap();
    assert!(price.is_finite());
    assert!(price > 0.0);
}

#[test]
fn absent_features_default_to_zero_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("listings.csv");
    write_listing_csv(&csv);
    let config = fast_config(&dir.path().join("cache"));

    let outcome = train_from_csv(&csv, &config).unwrap();

    let mut row = HashMap::new();
    row.insert("LuasTanah".to_string(), 500.0);
    row.insert("LuasBangunan".to_string(), 380.0);
    row.insert("JumlahKamarTidur".to_string(), 4.0);
    // No JumlahKamarMandi.
    let price = outcome.ensemble.predict_row(&row).unwrap();
    assert!(price.is_finite());
}

#[test]
fn non_csv_input_halts_before_any_fitting() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("listings.xlsx");
    std::fs::write(&xlsx, b"not a spreadsheet").unwrap();
    let cache_dir = dir.path().join("cache");
    let config = fast_config(&cache_dir);

    let err = train_from_csv(&xlsx, &config).err().unwrap();
    assert!(err.to_string().contains(".csv"), "got: {}", err);
    // Nothing was fitted, so nothing was cached.
    assert!(!cache_dir.exists());
}
