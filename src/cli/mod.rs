//! Linfit CLI Module
//!
//! Command-line driver for the regression workflow: inspect a dataset,
//! repair missing values, train, then reuse saved models.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{load_model, save_model, ModelRecord};
use crate::preprocessing::{profile_columns, PreprocessApplier, PreprocessMethod, PreprocessingConfig};
use crate::training::{LinearModel, TrainingConfig};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "linfit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Linear regression workbench: clean data, fit, save and reuse models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show column types and missing-value counts
    Inspect {
        /// Input data file (CSV, TSV, spreadsheet or SQLite)
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Handle missing values and write the result as CSV
    Preprocess {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Strategy (delete, mean, median, constant)
        #[arg(short, long)]
        method: Option<String>,

        /// Columns to process
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Replacement values for the constant strategy, one per column
        #[arg(long, value_delimiter = ',')]
        constants: Option<Vec<String>>,

        /// JSON preprocessing configuration, used instead of the flags above
        #[arg(long, conflicts_with_all = ["method", "columns", "constants"])]
        config: Option<PathBuf>,
    },

    /// Fit a linear model
    Train {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: String,

        /// Feature columns (default: every other numeric column)
        #[arg(short, long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Free-text description stored with the model
        #[arg(long, default_value = "")]
        description: String,

        /// Output model file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the summary of a saved model
    Show {
        /// Model file
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Predict with a saved model
    Predict {
        /// Model file
        #[arg(short, long)]
        model: PathBuf,

        /// Input data file holding the model's input columns
        #[arg(short, long, required_unless_present = "value")]
        data: Option<PathBuf>,

        /// Single input as NAME=VALUE, repeated once per input column
        #[arg(short, long, value_parser = parse_assignment, conflicts_with = "data")]
        value: Vec<(String, f64)>,

        /// Output CSV with a prediction column appended
        #[arg(short, long, requires = "data")]
        output: Option<PathBuf>,
    },
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.trim().to_string(), value))
}

/// Order `NAME=VALUE` pairs by the model's input columns
fn input_row(model: &LinearModel, values: &[(String, f64)]) -> anyhow::Result<Vec<f64>> {
    if let Some((name, _)) = values.iter().find(|(n, _)| !model.input_columns().contains(n)) {
        anyhow::bail!(
            "'{}' is not an input column of this model (expected {})",
            name,
            model.input_columns().join(", ")
        );
    }

    model
        .input_columns()
        .iter()
        .map(|name| {
            values
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| anyhow::anyhow!("missing value for input column '{}'", name))
        })
        .collect()
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    Ok(DataLoader::new().load_file(path)?)
}

fn load_step(path: &Path) -> anyhow::Result<DataFrame> {
    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));
    Ok(df)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_inspect(data_path: &Path) -> anyhow::Result<()> {
    section("Inspect");
    let df = load_step(data_path)?;

    println!();
    println!(
        "  {:<20} {:>8} {:>8} {:>12} {:>12}",
        muted("Column"), muted("Type"), muted("Missing"), muted("Mean"), muted("Range")
    );
    println!("  {}", dim(&"─".repeat(64)));

    for profile in profile_columns(&df)? {
        let mean = profile.mean.map(|m| format!("{:.4}", m)).unwrap_or_else(|| "-".into());
        let range = match (profile.min, profile.max) {
            (Some(lo), Some(hi)) => format!("{:.2}..{:.2}", lo, hi),
            _ => "-".into(),
        };
        let missing = if profile.null_count > 0 {
            profile.null_count.to_string().as_str().yellow()
        } else {
            profile.null_count.to_string().as_str().normal()
        };
        println!(
            "  {:<20} {:>8} {:>8} {:>12} {:>12}",
            profile.name,
            format!("{:?}", profile.dtype).to_lowercase(),
            missing,
            mean,
            range
        );
    }
    println!();
    Ok(())
}

pub fn cmd_preprocess(
    data_path: &Path,
    output_path: &Path,
    method: Option<&str>,
    columns: &[String],
    constants: Option<Vec<String>>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Preprocess");
    let mut df = load_step(data_path)?;

    let config = match config_path {
        Some(path) => PreprocessingConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => {
            let method = match method {
                Some(name) => Some(name.parse::<PreprocessMethod>()?),
                None => None,
            };
            PreprocessingConfig {
                method,
                constants,
                columns: columns.to_vec(),
            }
        }
    };

    let method_name = config.method.map(|m| m.name()).unwrap_or("none");
    step_run(&format!("Applying {}", method_name.cyan()));
    let rows_before = df.height();
    let mut applier = PreprocessApplier::new();
    applier.run(&mut df, &config)?;
    step_done(&format!("{} → {} rows", rows_before, df.height()));

    step_run(&format!("Saving → {}", output_path.display()));
    DataSaver::save_csv(&mut df, output_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    println!();
    Ok(())
}

pub fn cmd_train(
    data_path: &Path,
    target: &str,
    features: Option<Vec<String>>,
    description: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");
    let df = load_step(data_path)?;

    let mut config = TrainingConfig::new(target);
    if let Some(features) = features {
        config = config.with_features(features);
    }

    step_run(&format!("Fitting {}", "linear regression".cyan()));
    let start = Instant::now();
    let model = LinearModel::fit_with_config(&df, &config)?;
    step_done(&format!("{:?}", start.elapsed()));

    let record = ModelRecord::from_model(&model, description)?;
    println!();
    kv("Formula", &record.formula);
    kv("R²", &format!("{:.4}", record.metrics.r2));
    kv("RMSE", &format!("{:.4}", record.metrics.rmse));
    kv("Samples", &model.n_samples().to_string());

    if let Some(path) = output {
        let written = save_model(&record, path)?;
        println!();
        step_ok(&format!("Model saved → {}", written.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_show(model_path: &Path) -> anyhow::Result<()> {
    section("Model");
    let record = load_model(model_path)?;
    for line in record.to_string().lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: Option<&Path>,
    values: &[(String, f64)],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");
    let model = load_model(model_path)?.into_model()?;
    step_ok(&format!("Loaded model for {}", model.output_column().cyan()));

    match data_path {
        Some(path) => {
            let mut df = load_step(path)?;
            let predictions = model.predict_frame(&df)?;

            match output {
                Some(out) => {
                    let name = format!("{}_predicted", model.output_column());
                    df.with_column(Column::new(name.as_str().into(), predictions.to_vec()))?;
                    DataSaver::save_csv(&mut df, out)?;
                    step_ok(&format!("{} predictions saved → {}", predictions.len(), out.display()));
                }
                None => {
                    println!();
                    for (i, p) in predictions.iter().enumerate() {
                        println!("  {:>6} {:.4}", muted(&i.to_string()), p);
                    }
                }
            }
        }
        None => {
            let row = input_row(&model, values)?;
            let prediction = model.predict_row(&row)?;
            println!();
            kv(model.output_column(), &format!("{:.4}", prediction));
        }
    }

    println!();
    Ok(())
}
