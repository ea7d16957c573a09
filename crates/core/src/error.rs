//! Error types for crosstab computation.

use thiserror::Error;
use xtab_grid::GridError;

/// Result type for dataset and crosstab operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while building datasets or computing crosstabs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A requested dimension is not a field of the dataset.
    #[error("Field not found: {field}")]
    FieldNotFound { field: String },

    /// Every record was dropped or the dataset had no records.
    #[error("No data: every row of '{row_dimension}' was dropped or the dataset is empty")]
    EmptyResult { row_dimension: String },

    /// The request itself is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Two fields of a dataset share one name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Cell or weight conversion error.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl CoreError {
    /// Create a field-not-found error.
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Create a value conversion error.
    pub fn value_conversion(value: impl Into<String>, expected: &'static str) -> Self {
        Self::Grid(GridError::conversion(value, expected))
    }
}
