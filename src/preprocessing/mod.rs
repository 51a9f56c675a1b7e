//! Missing-value preprocessing
//!
//! - Missing-value counting per column
//! - Column profiles for choosing inputs and outputs
//! - One-shot remediation: delete rows, fill with mean, median or constants

mod applier;
mod config;
pub(crate) mod nulls;

pub use applier::{PreprocessApplier, PreprocessMethod};
pub use config::PreprocessingConfig;
pub use nulls::none_count;

use crate::error::Result;
use nulls::{is_numeric_dtype, missing_mask, present_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type as the wizard sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Text,
    Unknown,
}

/// Summary of one column, shown next to the column pickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            count: 0,
            null_count: 0,
            mean: None,
            min: None,
            max: None,
        }
    }

    /// Profile a single series
    pub fn from_series(series: &Series) -> Result<Self> {
        let dtype = if is_numeric_dtype(series.dtype()) {
            ColumnType::Numeric
        } else if matches!(series.dtype(), DataType::String) {
            ColumnType::Text
        } else {
            ColumnType::Unknown
        };

        let mut profile = Self::new(series.name().as_str(), dtype);
        profile.count = series.len();
        profile.null_count = missing_mask(series)?.into_iter().filter(|m| *m).count();

        if profile.dtype == ColumnType::Numeric {
            let values = present_values(series)?;
            if !values.is_empty() {
                profile.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
                profile.min = values.iter().copied().reduce(f64::min);
                profile.max = values.iter().copied().reduce(f64::max);
            }
        }

        Ok(profile)
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype == ColumnType::Numeric
    }
}

/// Profile every column of the frame, in column order
pub fn profile_columns(frame: &DataFrame) -> Result<Vec<ColumnProfile>> {
    frame
        .get_columns()
        .iter()
        .map(|col| ColumnProfile::from_series(col.as_materialized_series()))
        .collect()
}
