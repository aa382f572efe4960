//! rumah-estimator: cleaning and price estimation for the Jakarta Selatan
//! housing dataset.
//!
//! Two independent flows live here. The cleaner normalizes a raw listings
//! export (positional column rename, row filtering, type coercion, CSV
//! output). The estimator fits two base regressors (random forest, gradient
//! boosted trees) with grid-searched hyperparameters, stacks their
//! predictions under a meta random forest, caches every fitted model on
//! disk, and answers single-row price predictions.
pub mod cache;
pub mod cleaning;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod stacking;
pub mod tuning;
