//! Data loading utilities
//!
//! Turns a delimited text file, a spreadsheet or a single-table SQLite file
//! into a polars [`DataFrame`].

use crate::error::{LinfitError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Source formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Csv,
    Tsv,
    Spreadsheet,
    Sqlite,
}

impl FileFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "tsv" => Ok(FileFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(FileFormat::Spreadsheet),
            "db" | "sqlite" | "sqlite3" => Ok(FileFormat::Sqlite),
            _ => Err(LinfitError::DataError(format!(
                "unsupported file format: '{}'",
                path.display()
            ))),
        }
    }
}

/// Loader options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Rows scanned to infer CSV column types (None = whole file)
    pub infer_schema_length: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }
}

/// Data loader for the supported file formats
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    config: LoaderConfig,
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Set the number of rows used for CSV schema inference
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.config.infer_schema_length = rows;
        self
    }

    /// Detect the format from the extension and load.
    ///
    /// Fails with `IoError(NotFound)` for a missing path and `DataError` for
    /// an unknown extension, a database without tables or an empty table.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LinfitError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }

        let format = FileFormat::from_path(path)?;
        let df = match format {
            FileFormat::Csv => self.load_csv(path, b',')?,
            FileFormat::Tsv => self.load_csv(path, b'\t')?,
            FileFormat::Spreadsheet => self.load_spreadsheet(path)?,
            FileFormat::Sqlite => self.load_sqlite(path)?,
        };

        if df.height() == 0 || df.width() == 0 {
            return Err(LinfitError::DataError(format!(
                "'{}' contains no data",
                path.display()
            )));
        }

        info!(
            path = %path.display(),
            format = ?format,
            rows = df.height(),
            columns = df.width(),
            "Loaded dataset"
        );
        Ok(df)
    }

    /// Load a delimited text file with a header row
    pub fn load_csv(&self, path: &Path, separator: u8) -> Result<DataFrame> {
        let file = File::open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(separator);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.config.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| LinfitError::DataError(e.to_string()))
    }

    /// Load the first worksheet; its first row is the header
    pub fn load_spreadsheet(&self, path: &Path) -> Result<DataFrame> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LinfitError::DataError("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet)?;

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(DataFrame::empty()),
        };
        let body: Vec<&[Data]> = rows.collect();
        debug!(sheet = %sheet, rows = body.len(), "Reading worksheet");

        let columns = header
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let name = match name {
                    Data::Empty => format!("column_{}", j + 1),
                    other => other.to_string(),
                };
                let cells: Vec<&Data> = body.iter().map(|row| row.get(j).unwrap_or(&Data::Empty)).collect();
                sheet_column(&name, &cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Load every row of the first table listed in `sqlite_master`
    pub fn load_sqlite(&self, path: &Path) -> Result<DataFrame> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let table: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let table = table.ok_or_else(|| {
            LinfitError::DataError("the database does not contain any table".to_string())
        })?;
        debug!(table = %table, "Reading first table");

        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", table.replace('"', "\"\"")))?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut cells: Vec<Vec<SqlValue>> = vec![Vec::new(); names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (j, column) in cells.iter_mut().enumerate() {
                column.push(row.get::<_, SqlValue>(j)?);
            }
        }

        let columns = names
            .iter()
            .zip(&cells)
            .map(|(name, values)| sql_column(name, values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Numeric when every non-empty cell is a number, text otherwise
fn sheet_column(name: &str, cells: &[&Data]) -> Column {
    let numeric = cells
        .iter()
        .all(|c| matches!(c, Data::Empty | Data::Int(_) | Data::Float(_)));

    if numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(v) => Some(*v as f64),
                Data::Float(v) => Some(*v),
                _ => None,
            })
            .collect();
        Column::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|c| match c {
                Data::Empty => None,
                other => Some(other.to_string()),
            })
            .collect();
        Column::new(name.into(), values)
    }
}

/// Int64 for all-integer columns, Float64 for numeric ones, text otherwise
fn sql_column(name: &str, values: &[SqlValue]) -> Column {
    let all_integer = values
        .iter()
        .all(|v| matches!(v, SqlValue::Null | SqlValue::Integer(_)));
    let all_numeric = values
        .iter()
        .all(|v| matches!(v, SqlValue::Null | SqlValue::Integer(_) | SqlValue::Real(_)));

    if all_integer {
        let ints: Vec<Option<i64>> = values
            .iter()
            .map(|v| match v {
                SqlValue::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        Column::new(name.into(), ints)
    } else if all_numeric {
        let floats: Vec<Option<f64>> = values
            .iter()
            .map(|v| match v {
                SqlValue::Integer(i) => Some(*i as f64),
                SqlValue::Real(f) => Some(*f),
                _ => None,
            })
            .collect();
        Column::new(name.into(), floats)
    } else {
        let text: Vec<Option<String>> = values
            .iter()
            .map(|v| match v {
                SqlValue::Null => None,
                SqlValue::Integer(i) => Some(i.to_string()),
                SqlValue::Real(f) => Some(f.to_string()),
                SqlValue::Text(s) => Some(s.clone()),
                SqlValue::Blob(b) => Some(format!("<{} bytes>", b.len())),
            })
            .collect();
        Column::new(name.into(), text)
    }
}

/// Data saver
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;

        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| LinfitError::DataError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "a,b,c").unwrap();
        writeln!(file, "1,2,3").unwrap();
        writeln!(file, "4,,6").unwrap();
        writeln!(file, "7,8,9").unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = create_test_csv();
        let df = DataLoader::new().load_file(file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_tsv() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(file, "x\ty").unwrap();
        writeln!(file, "1\t2").unwrap();
        let df = DataLoader::new().load_file(file.path()).unwrap();
        assert_eq!(df.width(), 2);
        assert!(df.column("x").is_ok() && df.column("y").is_ok());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_path(Path::new("data.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("book.xls")).unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_path(Path::new("store.sqlite")).unwrap(), FileFormat::Sqlite);
        assert!(FileFormat::from_path(Path::new("notes.txt")).is_err());
        assert!(FileFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load_file("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LinfitError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = DataLoader::new().load_file(file.path()).unwrap_err();
        assert!(matches!(err, LinfitError::DataError(msg) if msg.contains("unsupported")));
    }

    #[test]
    fn test_sql_column_types() {
        let ints = sql_column("i", &[SqlValue::Integer(1), SqlValue::Null]);
        assert_eq!(ints.dtype(), &DataType::Int64);
        let floats = sql_column("f", &[SqlValue::Integer(1), SqlValue::Real(2.5)]);
        assert_eq!(floats.dtype(), &DataType::Float64);
        let text = sql_column("t", &[SqlValue::Text("a".into()), SqlValue::Real(2.5)]);
        assert_eq!(text.dtype(), &DataType::String);
    }

    #[test]
    fn test_sheet_column_types() {
        let numeric = sheet_column("n", &[&Data::Int(1), &Data::Empty, &Data::Float(2.5)]);
        assert_eq!(numeric.dtype(), &DataType::Float64);
        assert_eq!(numeric.null_count(), 1);
        let text = sheet_column("t", &[&Data::String("a".into()), &Data::Float(2.5)]);
        assert_eq!(text.dtype(), &DataType::String);
    }

    #[test]
    fn test_save_csv() {
        let mut df = DataFrame::new(vec![
            Column::new("a".into(), &[1, 2, 3]),
            Column::new("b".into(), &[4, 5, 6]),
        ]).unwrap();

        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        DataSaver::save_csv(&mut df, file.path()).unwrap();

        let loaded = DataLoader::new().load_file(file.path()).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.width(), 2);
    }
}
