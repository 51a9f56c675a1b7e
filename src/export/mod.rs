//! Model persistence
//!
//! Converts fitted or restored models to a [`ModelRecord`] and stores it as a
//! JSON `.linmodel` file.

mod record;
mod serializer;

pub use record::{ModelRecord, RecordColumns, RecordMetrics, REQUIRED_KEYS};
pub use serializer::{load_model, model_path, save_model, MODEL_EXTENSION};
