//! Exhaustive grid search with k-fold cross-validation.
//!
//! Every candidate from the declared grid is evaluated with deterministic
//! contiguous folds and the combination with the lowest cross-validated RMSE
//! wins. Fit failures are fatal and propagate to the caller.

use anyhow::{ensure, Result};

use crate::config::ModelParams;
use crate::math::{Array1, Array2};
use crate::models::{build_model, Regressor};

/// Result of a completed grid search.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub best: ModelParams,
    pub cv_rmse: f32,
    pub candidates: usize,
}

/// Evaluate every candidate and return the one minimizing CV RMSE.
pub fn grid_search_cv(
    candidates: &[ModelParams],
    x: &Array2<f32>,
    y: &Array1<f32>,
    folds: usize,
) -> Result<GridSearchOutcome> {
    ensure!(!candidates.is_empty(), "grid search needs at least one candidate");
    ensure!(folds >= 2, "grid search needs at least 2 folds");
    ensure!(
        x.nrows() >= folds,
        "insufficient rows for {}-fold cross-validation: {} rows",
        folds,
        x.nrows()
    );

    let fold_splits = kfold_indices(x.nrows(), folds);

    let mut best: Option<(f32, &ModelParams)> = None;
    for params in candidates {
        let mut squared_error = 0.0f64;
        for (train_idx, eval_idx) in &fold_splits {
            let x_train = x.select_rows(train_idx);
            let y_train = y.select(train_idx);
            let x_eval = x.select_rows(eval_idx);
            let y_eval = y.select(eval_idx);

            let mut model = build_model(params);
            model.fit(&x_train, &y_train)?;
            let preds = model
                .predict(&x_eval)
                .map_err(|e| anyhow::anyhow!("cross-validation predict failed: {}", e))?;

            for (p, t) in preds.iter().zip(y_eval.iter()) {
                squared_error += ((p - t) as f64).powi(2);
            }
        }
        let rmse = (squared_error / x.nrows() as f64).sqrt() as f32;
        log::debug!("candidate {:?} -> CV RMSE {:.2}", params, rmse);

        if best.map_or(true, |(b, _)| rmse < b) {
            best = Some((rmse, params));
        }
    }

    let (cv_rmse, best) = best.expect("candidates are non-empty");
    log::info!(
        "Grid search over {} candidates selected {:?} (CV RMSE {:.2})",
        candidates.len(),
        best,
        cv_rmse
    );

    Ok(GridSearchOutcome {
        best: best.clone(),
        cv_rmse,
        candidates: candidates.len(),
    })
}

/// Deterministic contiguous folds: fold `i` holds rows `[i*n/k, (i+1)*n/k)`.
fn kfold_indices(n: usize, folds: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let mut splits = Vec::with_capacity(folds);
    for fold in 0..folds {
        let start = fold * n / folds;
        let end = (fold + 1) * n / folds;
        let eval: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n).collect();
        splits.push((train, eval));
    }
    splits
}

/// Root mean squared error.
pub fn rmse(predicted: &Array1<f32>, actual: &Array1<f32>) -> f32 {
    assert_eq!(predicted.len(), actual.len(), "rmse requires equal lengths");
    if predicted.is_empty() {
        return 0.0;
    }
    let sum: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, t)| ((p - t) as f64).powi(2))
        .sum();
    (sum / predicted.len() as f64).sqrt() as f32
}

/// Coefficient of determination against the mean baseline.
pub fn r_squared(predicted: &Array1<f32>, actual: &Array1<f32>) -> f32 {
    assert_eq!(predicted.len(), actual.len(), "r_squared requires equal lengths");
    let mean = match actual.mean() {
        Some(m) => m as f64,
        None => return 0.0,
    };
    let ss_res: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, t)| ((t - p) as f64).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|&t| (t as f64 - mean).powi(2)).sum();
    if ss_tot <= f64::EPSILON {
        return 0.0;
    }
    (1.0 - ss_res / ss_tot) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kfold_covers_every_row_once() {
        let splits = kfold_indices(10, 3);
        assert_eq!(splits.len(), 3);
        let mut seen = vec![0usize; 10];
        for (train, eval) in &splits {
            assert_eq!(train.len() + eval.len(), 10);
            for &i in eval {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn rmse_of_exact_predictions_is_zero() {
        let a = Array1::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(rmse(&a, &a), 0.0);
        assert!((r_squared(&a, &a) - 1.0).abs() < 1e-6);
    }
}
