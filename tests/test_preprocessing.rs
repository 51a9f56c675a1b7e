//! Integration test: missing-value handling end-to-end

use linfit_studio::error::LinfitError;
use linfit_studio::preprocessing::{
    none_count, profile_columns, PreprocessApplier, PreprocessMethod, PreprocessingConfig,
};
use polars::prelude::*;

fn sample_df() -> DataFrame {
    df!(
        "age" => &[Some(25.0), None, Some(35.0), Some(40.0), None, Some(50.0)],
        "income" => &[Some(30000.0), Some(45000.0), None, Some(70000.0), Some(80000.0), Some(90000.0)],
        "score" => &[3.5, 4.0, 3.8, 4.5, 4.2, 4.8],
    )
    .unwrap()
}

fn applier_for(method: PreprocessMethod, constants: Option<Vec<String>>) -> PreprocessApplier {
    let mut applier = PreprocessApplier::new();
    applier.set_strategy(method, constants);
    applier
}

fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

#[test]
fn test_none_count_reports_per_column() {
    let df = sample_df();
    assert_eq!(none_count(&df, &["age", "income", "score"]).unwrap(), vec![2, 1, 0]);
}

#[test]
fn test_none_count_unknown_column() {
    let df = sample_df();
    let err = none_count(&df, &["age", "height"]).unwrap_err();
    assert!(matches!(err, LinfitError::ColumnNotFound(name) if name == "height"));
}

#[test]
fn test_delete_removes_rows_with_gaps() {
    let mut df = sample_df();
    applier_for(PreprocessMethod::Delete, None)
        .apply(&mut df, &["age", "income"])
        .unwrap();

    assert_eq!(df.height(), 3);
    assert_eq!(none_count(&df, &["age", "income"]).unwrap(), vec![0, 0]);
    assert_eq!(df.column("score").unwrap().f64().unwrap().get(0), Some(3.5));
}

#[test]
fn test_delete_is_idempotent() {
    let mut df = sample_df();
    let applier = applier_for(PreprocessMethod::Delete, None);
    applier.apply(&mut df, &["age"]).unwrap();
    let once = df.clone();
    applier.apply(&mut df, &["age"]).unwrap();
    assert!(df.equals_missing(&once));
}

#[test]
fn test_delete_only_checks_given_columns() {
    let mut df = sample_df();
    applier_for(PreprocessMethod::Delete, None).apply(&mut df, &["income"]).unwrap();
    assert_eq!(df.height(), 5);
    assert_eq!(none_count(&df, &["age"]).unwrap(), vec![2]);
}

#[test]
fn test_mean_closes_all_gaps() {
    let mut df = sample_df();
    applier_for(PreprocessMethod::Mean, None)
        .apply(&mut df, &["age", "income"])
        .unwrap();

    assert_eq!(df.height(), 6);
    assert_eq!(none_count(&df, &["age", "income"]).unwrap(), vec![0, 0]);
    // (25 + 35 + 40 + 50) / 4
    assert_eq!(f64_values(&df, "age")[1], Some(37.5));
}

#[test]
fn test_median_closes_all_gaps() {
    let mut df = sample_df();
    applier_for(PreprocessMethod::Median, None).apply(&mut df, &["income"]).unwrap();

    assert_eq!(none_count(&df, &["income"]).unwrap(), vec![0]);
    assert_eq!(f64_values(&df, "income")[2], Some(70000.0));
}

#[test]
fn test_constant_fills_exact_values() {
    let mut df = sample_df();
    let constants = Some(vec!["0".to_string(), "-1".to_string()]);
    applier_for(PreprocessMethod::Constant, constants)
        .apply(&mut df, &["age", "income"])
        .unwrap();

    let age = f64_values(&df, "age");
    assert_eq!(age[1], Some(0.0));
    assert_eq!(age[4], Some(0.0));
    assert_eq!(age[0], Some(25.0));
    assert_eq!(f64_values(&df, "income")[2], Some(-1.0));
}

#[test]
fn test_constant_count_mismatch_leaves_frame_unmodified() {
    let mut df = sample_df();
    let before = df.clone();
    let err = applier_for(PreprocessMethod::Constant, Some(vec!["1".to_string()]))
        .apply(&mut df, &["age", "income"])
        .unwrap_err();

    assert!(matches!(err, LinfitError::ValidationError(_)));
    assert!(df.equals_missing(&before));
}

#[test]
fn test_constant_comma_decimal_rejected() {
    let mut df = sample_df();
    let before = df.clone();
    let err = applier_for(PreprocessMethod::Constant, Some(vec!["1,5".to_string()]))
        .apply(&mut df, &["age"])
        .unwrap_err();

    assert!(matches!(err, LinfitError::ValidationError(msg) if msg.contains("decimal separator")));
    assert!(df.equals_missing(&before));
}

#[test]
fn test_unknown_column_leaves_frame_unmodified() {
    let mut df = sample_df();
    let before = df.clone();
    let err = applier_for(PreprocessMethod::Mean, None)
        .apply(&mut df, &["age", "height"])
        .unwrap_err();

    assert!(matches!(err, LinfitError::ColumnNotFound(_)));
    assert!(df.equals_missing(&before));
}

#[test]
fn test_run_from_json_config() {
    let mut df = sample_df();
    let config = PreprocessingConfig::from_json(
        r#"{"method": "constant", "constants": ["7"], "columns": ["age"]}"#,
    )
    .unwrap();

    let mut applier = PreprocessApplier::new();
    applier.run(&mut df, &config).unwrap();

    assert_eq!(applier.current_method(), Some(PreprocessMethod::Constant));
    assert_eq!(f64_values(&df, "age")[1], Some(7.0));
}

#[test]
fn test_profiles_follow_preprocessing() {
    let mut df = sample_df();
    assert_eq!(profile_columns(&df).unwrap()[0].null_count, 2);

    applier_for(PreprocessMethod::Delete, None).apply(&mut df, &["age"]).unwrap();
    let profiles = profile_columns(&df).unwrap();
    assert_eq!(profiles[0].null_count, 0);
    assert_eq!(profiles[0].count, 4);
}

#[test]
fn test_duplicate_target_column_rejected() {
    let mut df = sample_df();
    let before = df.clone();
    let constants = Some(vec!["5".to_string(), "9".to_string()]);
    let err = applier_for(PreprocessMethod::Constant, constants)
        .apply(&mut df, &["age", "age"])
        .unwrap_err();

    assert!(matches!(err, LinfitError::ValidationError(_)));
    assert!(df.equals_missing(&before));
}
