//! Model training module
//!
//! Ordinary least squares linear regression over user-chosen columns:
//! fitting, prediction, evaluation, formula rendering and parameter-only
//! restoration.

mod config;
mod metrics;
mod solver;
pub mod linear_models;

pub use config::TrainingConfig;
pub use linear_models::{LinearModel, ModelState};
pub use metrics::ModelMetrics;
