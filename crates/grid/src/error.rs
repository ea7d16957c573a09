use thiserror::Error;

/// Errors that can occur while loading or reading a grid
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Cannot convert {value:?} to {expected}")]
    ValueConversion { value: String, expected: &'static str },

    #[error("Index out of bounds: row {row}, col {col} (grid has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Row index out of bounds: {index} (grid has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create a value conversion error.
    pub fn conversion(value: impl Into<String>, expected: &'static str) -> Self {
        Self::ValueConversion {
            value: value.into(),
            expected,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
