//! Ordinary least squares linear regression over named columns

use crate::error::{LinfitError, Result};
use crate::export::ModelRecord;
use crate::preprocessing::nulls::{column_series, is_numeric_dtype, missing_mask};
use super::metrics::ModelMetrics;
use super::solver::solve_least_squares;
use super::TrainingConfig;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Lifecycle of a [`LinearModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    /// Columns chosen, no parameters yet
    Unfit,
    /// Parameters estimated from training data
    Fit,
    /// Parameters injected from a saved record
    Restored,
}

#[derive(Debug, Clone)]
struct TrainingData {
    x: Array2<f64>,
    y: Array1<f64>,
}

/// Linear regression model bound to named input and output columns.
///
/// Two ways in: [`fit_from_data`](Self::fit_from_data) estimates the
/// parameters from a frame, [`from_saved_record`](Self::from_saved_record)
/// rebuilds a predictor from persisted coefficients without any data.
#[derive(Debug, Clone)]
pub struct LinearModel {
    input_columns: Vec<String>,
    output_column: String,
    data: Option<TrainingData>,
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
    y_pred: Option<Array1<f64>>,
    metrics: Option<ModelMetrics>,
    formula: Option<String>,
    state: ModelState,
}

impl LinearModel {
    /// Create an unfit model that knows only its column roles
    pub fn new<I, S>(input_columns: I, output_column: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let input_columns: Vec<String> = input_columns.into_iter().map(Into::into).collect();
        let output_column = output_column.into();
        validate_roles(&input_columns, &output_column)?;

        Ok(Self {
            input_columns,
            output_column,
            data: None,
            coefficients: None,
            intercept: None,
            y_pred: None,
            metrics: None,
            formula: None,
            state: ModelState::Unfit,
        })
    }

    /// Create an unfit model and extract its training matrix from `frame`.
    ///
    /// Gaps are kept as `NaN` and rejected by [`fit`](Self::fit).
    pub fn with_data<I, S>(
        frame: &DataFrame,
        input_columns: I,
        output_column: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model = Self::new(input_columns, output_column)?;
        let x = feature_matrix(frame, &model.input_columns)?;
        let y = numeric_column(frame, &model.output_column)?;
        debug!(rows = x.nrows(), features = x.ncols(), "Extracted training data");
        model.data = Some(TrainingData { x, y });
        Ok(model)
    }

    /// Extract the training data and fit in one step
    pub fn fit_from_data<I, S>(
        frame: &DataFrame,
        input_columns: I,
        output_column: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut model = Self::with_data(frame, input_columns, output_column)?;
        model.fit()?;
        Ok(model)
    }

    /// Fit with the column roles of a [`TrainingConfig`]
    pub fn fit_with_config(frame: &DataFrame, config: &TrainingConfig) -> Result<Self> {
        let features = config.resolve_features(frame)?;
        Self::fit_from_data(frame, features, config.target_column.as_str())
    }

    /// Rebuild a usable model from a persisted record, keeping its metrics
    pub fn from_saved_record(record: &ModelRecord) -> Result<Self> {
        let mut model = Self::new(record.columns.input.iter().cloned(), record.columns.output.as_str())?;
        model.set_model_params(
            record.coefficients.clone(),
            record.intercept,
            record.formula.as_str(),
        )?;
        model.metrics = Some(ModelMetrics::from_persisted(record.metrics.r2, record.metrics.rmse));
        Ok(model)
    }

    /// Fit the model to its training data.
    ///
    /// Populates coefficients and intercept, then predictions, metrics and
    /// the formula.
    pub fn fit(&mut self) -> Result<&mut Self> {
        let start = Instant::now();
        let data = self.data.as_ref().ok_or_else(|| {
            LinfitError::ConfigError("model has no training data to fit on".to_string())
        })?;
        let (coefficients, intercept) = ols(&data.x, &data.y)?;

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
        self.state = ModelState::Fit;

        self.y_pred = Some(self.predict(None)?);
        let metrics = *self.evaluate()?;
        self.calc_formula()?;

        info!(
            output = %self.output_column,
            n_features = self.input_columns.len(),
            n_samples = self.n_samples(),
            r2 = metrics.r2,
            rmse = metrics.rmse,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fitted linear model"
        );
        Ok(self)
    }

    /// `intercept + x · coefficients` for each row.
    ///
    /// Without `x`, predicts the training rows.
    pub fn predict(&self, x: Option<&Array2<f64>>) -> Result<Array1<f64>> {
        let (coefficients, intercept) = self.params()?;
        let x = match x {
            Some(x) => x,
            None => {
                &self
                    .data
                    .as_ref()
                    .ok_or_else(|| {
                        LinfitError::ConfigError(
                            "no rows to predict and the model has no training data".to_string(),
                        )
                    })?
                    .x
            }
        };

        if x.ncols() != coefficients.len() {
            return Err(LinfitError::ShapeError {
                expected: format!("{} feature columns", coefficients.len()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        Ok(x.dot(coefficients) + intercept)
    }

    /// Predict the rows of a frame that holds the input columns by name
    pub fn predict_frame(&self, frame: &DataFrame) -> Result<Array1<f64>> {
        let x = feature_matrix(frame, &self.input_columns)?;
        if let Some(pos) = x.iter().position(|v| v.is_nan()) {
            let column = &self.input_columns[pos % x.ncols()];
            return Err(LinfitError::ValidationError(format!(
                "column '{}' has missing values; preprocess it before predicting",
                column
            )));
        }
        self.predict(Some(&x))
    }

    /// Predict a single row given one value per input column
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.input_columns.len() {
            return Err(LinfitError::ShapeError {
                expected: format!("{} values", self.input_columns.len()),
                actual: format!("{} values", row.len()),
            });
        }
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec())?;
        Ok(self.predict(Some(&x))?[0])
    }

    /// Compute R², MSE and RMSE between the training target and predictions
    pub fn evaluate(&mut self) -> Result<&ModelMetrics> {
        let not_ready = || {
            LinfitError::ConfigError(
                "predictions not yet generated; fit the model before evaluating".to_string(),
            )
        };
        let y_pred = self.y_pred.as_ref().ok_or_else(not_ready)?;
        let data = self.data.as_ref().ok_or_else(not_ready)?;

        let metrics = ModelMetrics::compute_regression(&data.y, y_pred);
        Ok(self.metrics.insert(metrics))
    }

    /// Build `"<output> = <intercept>" + " + (<coef> * <input>)"...`, two decimals
    pub fn calc_formula(&mut self) -> Result<&str> {
        let (coefficients, intercept) = self.params()?;

        let mut formula = format!("{} = {:.2}", self.output_column, intercept);
        for (coef, column) in coefficients.iter().zip(&self.input_columns) {
            formula.push_str(&format!(" + ({:.2} * {})", coef, column));
        }

        Ok(self.formula.insert(formula).as_str())
    }

    /// Inject persisted parameters; the model is usable for prediction right away
    pub fn set_model_params(
        &mut self,
        coefficients: Vec<f64>,
        intercept: f64,
        formula: impl Into<String>,
    ) -> Result<&mut Self> {
        if coefficients.len() != self.input_columns.len() {
            return Err(LinfitError::ValidationError(format!(
                "{} coefficients given for {} input columns",
                coefficients.len(),
                self.input_columns.len()
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(LinfitError::ValidationError(
                "coefficients and intercept must be finite numbers".to_string(),
            ));
        }

        self.coefficients = Some(Array1::from(coefficients));
        self.intercept = Some(intercept);
        self.formula = Some(formula.into());
        self.y_pred = None;
        self.metrics = None;
        self.state = ModelState::Restored;
        Ok(self)
    }

    fn params(&self) -> Result<(&Array1<f64>, f64)> {
        match (&self.coefficients, self.intercept) {
            (Some(coefficients), Some(intercept)) => Ok((coefficients, intercept)),
            _ => Err(LinfitError::ModelNotFitted),
        }
    }

    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    pub fn output_column(&self) -> &str {
        &self.output_column
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    pub fn metrics(&self) -> Option<&ModelMetrics> {
        self.metrics.as_ref()
    }

    /// Predictions on the training rows, once fitted
    pub fn predictions(&self) -> Option<&Array1<f64>> {
        self.y_pred.as_ref()
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Whether coefficients are available, fitted or restored
    pub fn is_fitted(&self) -> bool {
        self.state != ModelState::Unfit
    }

    /// Number of training rows (0 for models without data)
    pub fn n_samples(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.y.len())
    }
}

fn validate_roles(input_columns: &[String], output_column: &str) -> Result<()> {
    if input_columns.is_empty() {
        return Err(LinfitError::ConfigError(
            "at least one input column must be selected".to_string(),
        ));
    }
    if output_column.is_empty() {
        return Err(LinfitError::ConfigError("an output column must be selected".to_string()));
    }

    let mut seen = HashSet::new();
    for column in input_columns {
        if !seen.insert(column.as_str()) {
            return Err(LinfitError::ValidationError(format!(
                "input column '{}' listed more than once",
                column
            )));
        }
        if column == output_column {
            return Err(LinfitError::ValidationError(format!(
                "column '{}' cannot be both input and output",
                column
            )));
        }
    }
    Ok(())
}

/// Numeric column as `f64`, with gaps as `NaN`
fn numeric_column(frame: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let series = column_series(frame, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(LinfitError::ValidationError(format!(
            "column '{}' is not numeric ({})",
            name,
            series.dtype()
        )));
    }

    let missing = missing_mask(series)?;
    let cast = series.cast(&DataType::Float64)?;
    let values: Vec<f64> = cast
        .f64()?
        .into_iter()
        .zip(missing)
        .map(|(v, gap)| if gap { f64::NAN } else { v.unwrap_or(f64::NAN) })
        .collect();
    Ok(Array1::from(values))
}

/// Rows = frame rows, columns = `columns` in order
fn feature_matrix(frame: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let mut x = Array2::<f64>::zeros((frame.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        x.column_mut(j).assign(&numeric_column(frame, name)?);
    }
    Ok(x)
}

/// OLS with intercept: center, solve the normal equations, recover the intercept
fn ols(x: &Array2<f64>, y: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
    if x.iter().chain(y.iter()).any(|v| v.is_nan()) {
        return Err(LinfitError::FitError(
            "unresolved missing values in the selected columns; preprocess them first".to_string(),
        ));
    }
    if x.iter().chain(y.iter()).any(|v| v.is_infinite()) {
        return Err(LinfitError::FitError(
            "non-finite values in the selected columns".to_string(),
        ));
    }
    if x.nrows() < 2 {
        return Err(LinfitError::FitError(format!(
            "at least 2 rows are needed to fit, got {}",
            x.nrows()
        )));
    }

    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| LinfitError::FitError("empty feature matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
    let y_centered = y - y_mean;

    let coefficients = solve_least_squares(&x_centered, &y_centered).ok_or_else(|| {
        LinfitError::FitError(
            "feature matrix is singular (constant or collinear input columns)".to_string(),
        )
    })?;
    let intercept = y_mean - coefficients.dot(&x_mean);

    Ok((coefficients, intercept))
}
