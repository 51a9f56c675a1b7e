//! Fit-quality metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for a regression fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// R-squared
    pub r2: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Squared Error
    pub mse: f64,
}

impl ModelMetrics {
    /// Compute regression metrics
    pub fn compute_regression(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;

        let y_mean: f64 = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

        // a constant target is explained perfectly or not at all
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Self {
            r2,
            rmse: mse.sqrt(),
            mse,
        }
    }

    /// Rebuild metrics from the persisted pair
    pub fn from_persisted(r2: f64, rmse: f64) -> Self {
        Self {
            r2,
            rmse,
            mse: rmse * rmse,
        }
    }
}
