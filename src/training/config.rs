//! Training configuration

use crate::error::{LinfitError, Result};
use crate::preprocessing::profile_columns;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Column roles for a regression run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,

    /// Feature column names (None = every numeric column except the target)
    #[serde(default)]
    pub feature_columns: Option<Vec<String>>,
}

impl TrainingConfig {
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            feature_columns: None,
        }
    }

    /// Builder method to pin the feature columns
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_columns = Some(features.into_iter().map(Into::into).collect());
        self
    }

    /// Feature columns to use against `frame`
    pub fn resolve_features(&self, frame: &DataFrame) -> Result<Vec<String>> {
        if let Some(features) = &self.feature_columns {
            return Ok(features.clone());
        }

        let features: Vec<String> = profile_columns(frame)?
            .into_iter()
            .filter(|p| p.is_numeric() && p.name != self.target_column)
            .map(|p| p.name)
            .collect();

        if features.is_empty() {
            return Err(LinfitError::ConfigError(format!(
                "no numeric feature columns besides '{}'",
                self.target_column
            )));
        }
        Ok(features)
    }
}
