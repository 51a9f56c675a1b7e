use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linfit_studio::preprocessing::{PreprocessApplier, PreprocessMethod};
use linfit_studio::training::LinearModel;
use polars::prelude::*;
use rand::prelude::*;

fn feature_names(n_features: usize) -> Vec<String> {
    (0..n_features).map(|i| format!("feature_{}", i)).collect()
}

fn create_regression_data(n_rows: usize, n_features: usize) -> DataFrame {
    let mut rng = rand::thread_rng();

    let features: Vec<Vec<f64>> = (0..n_features)
        .map(|_| (0..n_rows).map(|_| rng.gen::<f64>() * 10.0).collect())
        .collect();

    // Target as weighted sum of features + noise
    let target: Vec<f64> = (0..n_rows)
        .map(|i| {
            let sum: f64 = features.iter().enumerate().map(|(j, f)| (j + 1) as f64 * f[i]).sum();
            sum + rng.gen::<f64>() * 0.1
        })
        .collect();

    let mut columns: Vec<Column> = feature_names(n_features)
        .into_iter()
        .zip(features)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    columns.push(Column::new("target".into(), target));

    DataFrame::new(columns).unwrap()
}

fn with_gaps(df: &DataFrame, every: usize) -> DataFrame {
    let mut df = df.clone();
    let values: Vec<Option<f64>> = df
        .column("feature_0")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, v)| if i % every == 0 { None } else { v })
        .collect();
    df.with_column(Column::new("feature_0".into(), values)).unwrap();
    df
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    for n_rows in [1000, 10000, 100000].iter() {
        let df = create_regression_data(*n_rows, 10);
        let features = feature_names(10);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &df, |b, df| {
            b.iter(|| LinearModel::fit_from_data(black_box(df), features.clone(), "target").unwrap())
        });
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let train_df = create_regression_data(5000, 10);
    let model = LinearModel::fit_from_data(&train_df, feature_names(10), "target").unwrap();

    for n_rows in [100, 1000, 10000].iter() {
        let test_df = create_regression_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("predict", n_rows), &test_df, |b, df| {
            b.iter(|| model.predict_frame(black_box(df)).unwrap())
        });
    }

    group.finish();
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");
    let df = with_gaps(&create_regression_data(10000, 5), 7);

    for method in PreprocessMethod::ALL {
        let mut applier = PreprocessApplier::new();
        let constants = (method == PreprocessMethod::Constant).then(|| vec!["0".to_string()]);
        applier.set_strategy(method, constants);

        group.bench_function(BenchmarkId::new("apply", method.name()), |b| {
            b.iter(|| {
                let mut frame = df.clone();
                applier.apply(&mut frame, &["feature_0"]).unwrap();
                frame
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction, bench_preprocessing);
criterion_main!(benches);
