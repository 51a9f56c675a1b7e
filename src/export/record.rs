//! Persisted form of a trained linear model

use crate::error::{LinfitError, Result};
use crate::training::{LinearModel, ModelMetrics, ModelState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys a model file must carry to be loadable
pub const REQUIRED_KEYS: [&str; 5] = ["formula", "coefficients", "intercept", "metrics", "columns"];

/// Fit quality as stored on disk. `rmse` holds the root mean squared error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordMetrics {
    #[serde(alias = "r2_score")]
    pub r2: f64,
    pub rmse: f64,
}

impl From<&ModelMetrics> for RecordMetrics {
    fn from(metrics: &ModelMetrics) -> Self {
        Self {
            r2: metrics.r2,
            rmse: metrics.rmse,
        }
    }
}

/// Column roles as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordColumns {
    pub input: Vec<String>,
    pub output: String,
}

/// Serializable description of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub formula: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub description: String,
    pub metrics: RecordMetrics,
    pub columns: RecordColumns,
}

impl ModelRecord {
    /// Snapshot a fitted or restored model.
    ///
    /// Restored models keep the metrics they were loaded with.
    pub fn from_model(model: &LinearModel, description: impl Into<String>) -> Result<Self> {
        if model.state() == ModelState::Unfit {
            return Err(LinfitError::ModelNotFitted);
        }
        let coefficients = model.coefficients().ok_or(LinfitError::ModelNotFitted)?;
        let intercept = model.intercept().ok_or(LinfitError::ModelNotFitted)?;
        let metrics = model.metrics().ok_or_else(|| {
            LinfitError::ConfigError("model has no metrics to save; fit it first".to_string())
        })?;
        let formula = model.formula().ok_or_else(|| {
            LinfitError::ConfigError("model has no formula to save".to_string())
        })?;

        Ok(Self {
            formula: formula.to_string(),
            coefficients: coefficients.to_vec(),
            intercept,
            description: description.into(),
            metrics: metrics.into(),
            columns: RecordColumns {
                input: model.input_columns().to_vec(),
                output: model.output_column().to_string(),
            },
        })
    }

    /// Rebuild a usable model from this record
    pub fn into_model(&self) -> Result<LinearModel> {
        LinearModel::from_saved_record(self)
    }

    /// Parse a record, naming the first missing required key
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            LinfitError::ValidationError("model file does not hold a model record".to_string())
        })?;

        if let Some(key) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(LinfitError::ValidationError(format!(
                "model file is missing required key '{}'",
                key
            )));
        }

        let record: Self = serde_json::from_value(value)
            .map_err(|e| LinfitError::ValidationError(format!("malformed model record: {}", e)))?;
        record.validate()?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants a loaded record must satisfy
    pub fn validate(&self) -> Result<()> {
        if self.columns.input.is_empty() {
            return Err(LinfitError::ValidationError(
                "model record has no input columns".to_string(),
            ));
        }
        if self.coefficients.len() != self.columns.input.len() {
            return Err(LinfitError::ValidationError(format!(
                "model record has {} coefficients for {} input columns",
                self.coefficients.len(),
                self.columns.input.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ModelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coefficients: Vec<String> = self.coefficients.iter().map(|c| format!("{:.4}", c)).collect();

        writeln!(f, "Formula:        {}", self.formula)?;
        writeln!(f, "R²:             {:.4}", self.metrics.r2)?;
        writeln!(f, "RMSE:           {:.4}", self.metrics.rmse)?;
        writeln!(f, "Intercept:      {:.4}", self.intercept)?;
        writeln!(f, "Coefficients:   [{}]", coefficients.join(", "))?;
        writeln!(f, "Input columns:  {}", self.columns.input.join(", "))?;
        write!(f, "Output column:  {}", self.columns.output)?;
        if !self.description.is_empty() {
            write!(f, "\nDescription:    {}", self.description)?;
        }
        Ok(())
    }
}
