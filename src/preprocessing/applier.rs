//! Missing-value remediation applied in place to a column subset

use crate::error::{LinfitError, Result};
use super::nulls::{column_series, is_numeric_dtype, missing_mask, present_values};
use super::PreprocessingConfig;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

const NOT_CONFIGURED: &str =
    "a preprocessing method and target columns must be chosen before applying";

const DECIMAL_SEPARATOR: &str = "constants must be numbers using '.' as the decimal separator";

/// Strategy for handling missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessMethod {
    /// Drop every row with a gap in any target column
    Delete,
    /// Fill gaps with the column mean
    Mean,
    /// Fill gaps with the column median
    Median,
    /// Fill gaps with one user-supplied constant per column
    Constant,
}

impl PreprocessMethod {
    pub const ALL: [PreprocessMethod; 4] = [
        PreprocessMethod::Delete,
        PreprocessMethod::Mean,
        PreprocessMethod::Median,
        PreprocessMethod::Constant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PreprocessMethod::Delete => "delete",
            PreprocessMethod::Mean => "mean",
            PreprocessMethod::Median => "median",
            PreprocessMethod::Constant => "constant",
        }
    }
}

impl fmt::Display for PreprocessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreprocessMethod {
    type Err = LinfitError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| LinfitError::ConfigError(format!("unknown preprocessing method '{}'", s)))
    }
}

/// Applies the selected missing-value strategy to a frame.
///
/// The applier only remembers the selected method and its constants; target
/// columns are passed to every [`apply`](Self::apply) call.
#[derive(Debug, Clone, Default)]
pub struct PreprocessApplier {
    method: Option<PreprocessMethod>,
    constants: Option<Vec<String>>,
}

impl PreprocessApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a strategy by name. Constants are stored as given and only
    /// checked when a `Constant` application runs.
    pub fn set_method(&mut self, name: &str, constants: Option<Vec<String>>) -> Result<()> {
        let method = name.parse::<PreprocessMethod>()?;
        self.set_strategy(method, constants);
        Ok(())
    }

    pub fn set_strategy(&mut self, method: PreprocessMethod, constants: Option<Vec<String>>) {
        self.method = Some(method);
        self.constants = constants;
    }

    pub fn current_method(&self) -> Option<PreprocessMethod> {
        self.method
    }

    pub fn constants(&self) -> Option<&[String]> {
        self.constants.as_deref()
    }

    /// Select the configured strategy and apply it to the configured columns
    pub fn run(&mut self, frame: &mut DataFrame, config: &PreprocessingConfig) -> Result<()> {
        match config.method {
            Some(method) => self.set_strategy(method, config.constants.clone()),
            None => return Err(LinfitError::ConfigError(NOT_CONFIGURED.to_string())),
        }
        self.apply(frame, &config.columns)
    }

    /// Execute the selected strategy against `columns` of `frame`.
    ///
    /// Every check runs before the frame is touched: on error the frame is
    /// left exactly as it was.
    pub fn apply<S: AsRef<str>>(&self, frame: &mut DataFrame, columns: &[S]) -> Result<()> {
        let method = match self.method {
            Some(method) if !columns.is_empty() => method,
            _ => return Err(LinfitError::ConfigError(NOT_CONFIGURED.to_string())),
        };
        let columns: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(*name) {
                return Err(LinfitError::ValidationError(format!(
                    "column '{}' listed more than once",
                    name
                )));
            }
            column_series(frame, name)?;
        }

        let rows_before = frame.height();
        let outcome = match method {
            PreprocessMethod::Delete => delete_rows(frame, &columns),
            PreprocessMethod::Mean => fill_values(frame, &columns, mean)
                .and_then(|fills| fill_columns(frame, &columns, &fills)),
            PreprocessMethod::Median => fill_values(frame, &columns, median)
                .and_then(|fills| fill_columns(frame, &columns, &fills)),
            PreprocessMethod::Constant => self
                .parse_constants(&columns)
                .and_then(|fills| fill_columns(frame, &columns, &fills)),
        };
        outcome.map_err(|e| match e {
            LinfitError::DataError(msg) => {
                LinfitError::PreprocessingError(format!("unexpected error: {}", msg))
            }
            other => other,
        })?;

        info!(
            method = %method,
            columns = ?columns,
            rows_before,
            rows_after = frame.height(),
            "Applied preprocessing"
        );
        Ok(())
    }

    fn parse_constants(&self, columns: &[&str]) -> Result<Vec<f64>> {
        let constants = self.constants.as_deref().unwrap_or(&[]);
        if constants.len() != columns.len() {
            return Err(LinfitError::ValidationError(format!(
                "expected {} constants (one per column), got {}",
                columns.len(),
                constants.len()
            )));
        }

        columns
            .iter()
            .zip(constants)
            .map(|(name, raw)| {
                let trimmed = raw.trim();
                match trimmed.parse::<f64>() {
                    Ok(v) if !trimmed.is_empty() && v.is_finite() => Ok(v),
                    _ => Err(LinfitError::ValidationError(format!(
                        "{} (column '{}': '{}')",
                        DECIMAL_SEPARATOR, name, raw
                    ))),
                }
            })
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn ensure_numeric(series: &Series) -> Result<()> {
    if is_numeric_dtype(series.dtype()) {
        Ok(())
    } else {
        Err(LinfitError::ValidationError(format!(
            "column '{}' is not numeric ({})",
            series.name(),
            series.dtype()
        )))
    }
}

/// Per-column statistic over the non-missing values
fn fill_values(frame: &DataFrame, columns: &[&str], stat: fn(&[f64]) -> f64) -> Result<Vec<f64>> {
    columns
        .iter()
        .map(|name| {
            let series = column_series(frame, name)?;
            ensure_numeric(series)?;
            let values = present_values(series)?;
            if values.is_empty() {
                return Err(LinfitError::ValidationError(format!(
                    "column '{}' has no values to compute a fill from",
                    name
                )));
            }
            Ok(stat(&values))
        })
        .collect()
}

/// Replace gaps in each column with its fill value.
///
/// Replacement series are all built before the first write.
fn fill_columns(frame: &mut DataFrame, columns: &[&str], fills: &[f64]) -> Result<()> {
    let mut replacements = Vec::with_capacity(columns.len());
    for (name, &fill) in columns.iter().zip(fills) {
        let series = column_series(frame, name)?;
        ensure_numeric(series)?;
        let missing = missing_mask(series)?;
        let cast = series.cast(&DataType::Float64)?;
        let ca = cast.f64()?;
        let filled: Float64Chunked = ca
            .into_iter()
            .zip(missing)
            .map(|(v, gap)| if gap { Some(fill) } else { v })
            .collect();
        debug!(column = %name, fill, "Filling missing values");
        replacements.push(filled.with_name(series.name().clone()).into_series());
    }

    for series in replacements {
        frame.with_column(series)?;
    }
    Ok(())
}

/// Drop every row that has a gap in any of `columns`
fn delete_rows(frame: &mut DataFrame, columns: &[&str]) -> Result<()> {
    let mut keep = vec![true; frame.height()];
    for name in columns {
        let missing = missing_mask(column_series(frame, name)?)?;
        for (k, gap) in keep.iter_mut().zip(missing) {
            if gap {
                *k = false;
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    *frame = frame.filter(&mask)?;
    Ok(())
}
