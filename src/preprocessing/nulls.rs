//! Missing-value detection and counting

use crate::error::{LinfitError, Result};
use polars::prelude::*;

/// Look up a column by name and return it as a materialized series
pub(crate) fn column_series<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Series> {
    frame
        .column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| LinfitError::ColumnNotFound(name.to_string()))
}

/// Check if dtype is numeric
pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Per-row missing flags for a series.
///
/// Nulls are missing for every dtype; in float columns `NaN` is missing too.
pub(crate) fn missing_mask(series: &Series) -> Result<Vec<bool>> {
    if is_float_dtype(series.dtype()) {
        let cast = series.cast(&DataType::Float64)?;
        let ca = cast.f64()?;
        Ok(ca.into_iter().map(|v| v.map_or(true, f64::is_nan)).collect())
    } else {
        Ok(series
            .is_null()
            .into_iter()
            .map(|v| v.unwrap_or(true))
            .collect())
    }
}

/// Non-missing values of a numeric series, widened to `f64`
pub(crate) fn present_values(series: &Series) -> Result<Vec<f64>> {
    let cast = series.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    Ok(ca
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Count missing entries in each of `columns`, in the order requested.
///
/// Fails with [`LinfitError::ColumnNotFound`] if any name is absent.
pub fn none_count<S: AsRef<str>>(frame: &DataFrame, columns: &[S]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|name| {
            let series = column_series(frame, name.as_ref())?;
            Ok(missing_mask(series)?.into_iter().filter(|m| *m).count())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gappy_df() -> DataFrame {
        DataFrame::new(vec![
            Column::new("a".into(), &[Some(1.0), None, Some(3.0), None]),
            Column::new("b".into(), &[None, Some(2.0), Some(3.0), Some(4.0)]),
            Column::new("name".into(), &[Some("x"), None, Some("z"), Some("w")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_none_count_in_request_order() {
        let df = gappy_df();
        assert_eq!(none_count(&df, &["a", "b"]).unwrap(), vec![2, 1]);
        assert_eq!(none_count(&df, &["b", "a"]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_none_count_text_column() {
        let df = gappy_df();
        assert_eq!(none_count(&df, &["name"]).unwrap(), vec![1]);
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let df = DataFrame::new(vec![Column::new(
            "v".into(),
            &[1.0, f64::NAN, 3.0],
        )])
        .unwrap();
        assert_eq!(none_count(&df, &["v"]).unwrap(), vec![1]);
    }

    #[test]
    fn test_unknown_column() {
        let df = gappy_df();
        let err = none_count(&df, &["a", "missing"]).unwrap_err();
        assert!(matches!(err, LinfitError::ColumnNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_present_values_skip_gaps() {
        let df = gappy_df();
        let values = present_values(column_series(&df, "a").unwrap()).unwrap();
        assert_eq!(values, vec![1.0, 3.0]);
    }
}
