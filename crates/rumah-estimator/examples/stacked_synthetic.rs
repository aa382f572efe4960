use std::collections::HashMap;

use rumah_estimator::config::{GbdtParams, ModelParams, RfParams};
use rumah_estimator::math::{Array1, Array2};
use rumah_estimator::models::{build_model, Regressor};
use rumah_estimator::report::format_rupiah;
use rumah_estimator::stacking::{train_meta, StackedEnsemble};

fn main() {
    env_logger::init();

    // Synthetic listings: price grows with land and building area.
    let n = 30;
    let mut features = Vec::with_capacity(n * 4);
    let mut prices = Vec::with_capacity(n);
    for i in 0..n {
        let land = 100.0 + 40.0 * i as f32;
        let building = 80.0 + 30.0 * i as f32;
        let bedrooms = 2.0 + (i % 6) as f32;
        let bathrooms = 1.0 + (i % 4) as f32;
        features.extend_from_slice(&[land, building, bedrooms, bathrooms]);
        prices.push(1_000_000_000.0 + 2_000_000.0 * land + 1_500_000.0 * building);
    }
    let x = Array2::from_shape_vec((n, 4), features).expect("failed to create feature matrix");
    let y = Array1::from_vec(prices);

    println!("Synthetic X shape: {:?}", x.shape());

    let mut rf = build_model(&ModelParams::RandomForest(RfParams {
        n_estimators: 30,
        max_depth: Some(8),
        min_samples_split: 2,
        min_samples_leaf: 1,
        seed: 42,
    }));
    rf.fit(&x, &y).expect("random forest fit failed");

    let mut gbdt = build_model(&ModelParams::GradientBoosting(GbdtParams {
        n_estimators: 50,
        max_depth: 4,
        learning_rate: 0.1,
        min_leaf_size: 1,
    }));
    gbdt.fit(&x, &y).expect("gradient boosting fit failed");

    let meta = train_meta(&rf, &gbdt, &x, &y).expect("meta fit failed");

    let ensemble = StackedEnsemble {
        rf,
        gbdt,
        meta,
        feature_names: rumah_estimator::data_handling::FEATURE_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let mut row = HashMap::new();
    row.insert("LuasTanah".to_string(), 500.0);
    row.insert("LuasBangunan".to_string(), 380.0);
    row.insert("JumlahKamarTidur".to_string(), 4.0);
    row.insert("JumlahKamarMandi".to_string(), 2.0);

    let price = ensemble.predict_row(&row).expect("prediction failed");
    println!("Predicted price: {}", format_rupiah(price));
}
