//! Regressor implementations and the trait that unifies them.
pub mod factory;
pub mod gradient_boost;
pub mod random_forest;
pub mod regressor;
pub mod tree;

pub use factory::{build_model, BaseRegressor};
pub use regressor::Regressor;
