//! Preprocessing configuration

use serde::{Deserialize, Serialize};
use super::PreprocessMethod;

/// One preprocessing step: which strategy, on which columns, with which constants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    /// Strategy for handling missing values
    pub method: Option<PreprocessMethod>,

    /// Replacement values for `Constant`, one per column, as typed by the user
    #[serde(default)]
    pub constants: Option<Vec<String>>,

    /// Columns the strategy is applied to
    #[serde(default)]
    pub columns: Vec<String>,
}

impl PreprocessingConfig {
    /// Create a configuration for the given strategy
    pub fn new(method: PreprocessMethod) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Builder method to set target columns
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set constants
    pub fn with_constants<I, S>(mut self, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constants = Some(constants.into_iter().map(Into::into).collect());
        self
    }

    /// Load a configuration from its JSON form
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
