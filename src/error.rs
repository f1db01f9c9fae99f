use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading a source file into a dataset. Any bad row fails
/// the whole load; rows are numbered from 1, header excluded.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV{}: {source}", row_suffix(.row))]
    Csv {
        row: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: no value in required column '{column}'")]
    MissingValue { row: u64, column: &'static str },

    #[error("row {row}: '{value}' in column '{column}' is not a non-negative integer")]
    InvalidValue {
        row: u64,
        column: &'static str,
        value: String,
    },
}

fn row_suffix(row: &Option<u64>) -> String {
    match row {
        Some(r) => format!(" at row {}", r),
        None => String::new(),
    }
}

/// Correlation requested on data that cannot support it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("correlation needs at least 2 rows, dataset has {rows}")]
    InsufficientData { rows: usize },

    #[error("column '{column}' has zero variance, correlation is undefined")]
    DegenerateInput { column: &'static str },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type Result<T> = std::result::Result<T, Error>;
