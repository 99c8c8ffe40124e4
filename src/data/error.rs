use thiserror::Error;

/// Failure to turn an input file into a [`Dataset`](super::model::Dataset).
/// Loading is all-or-nothing: any of these aborts the whole load.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' value '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: year '{value}' is not an integer")]
    InvalidYear { row: usize, value: String },

    #[error("row {row}: station name is missing")]
    MissingStation { row: usize },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A lookup into a computed summary that has no entry for the key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("station '{0}' not found")]
    StationNotFound(String),

    #[error("station '{station}' has no data for {year}")]
    YearNotFound { station: String, year: i32 },
}
