// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpportunityError>;

#[derive(Debug, Error)]
pub enum OpportunityError {
    /// The report could not be read as a CSV table with a header row.
    #[error("error reading the file: {0}")]
    Parse(String),

    /// A column the scorer cannot work without is absent.
    #[error("'{0}' column is missing from the dataset")]
    MissingColumn(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart rendering error: {0}")]
    Chart(String),
}
