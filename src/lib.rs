//! Linfit Studio - linear regression workbench
//!
//! This crate provides the core of a step-by-step regression workflow:
//! - Tabular data loading from CSV, spreadsheets and SQLite
//! - Missing-value inspection and repair
//! - Ordinary least squares fitting, evaluation and prediction
//! - Model persistence and restoration
//!
//! # Modules
//!
//! - [`utils`] - Data loading and saving
//! - [`preprocessing`] - Missing-value counting and handling strategies
//! - [`training`] - Linear model lifecycle
//! - [`export`] - Model record serialization
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod preprocessing;
pub mod training;
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{LinfitError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ErrorCategory, LinfitError, Result};

    // Data loading
    pub use crate::utils::{DataLoader, DataSaver};

    // Preprocessing
    pub use crate::preprocessing::{
        none_count, profile_columns, ColumnProfile, PreprocessApplier, PreprocessMethod,
        PreprocessingConfig,
    };

    // Training
    pub use crate::training::{LinearModel, ModelMetrics, ModelState, TrainingConfig};

    // Export
    pub use crate::export::{load_model, save_model, ModelRecord};
}
