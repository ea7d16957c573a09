//! # xtab-core
//!
//! Datasets and crosstab computation.
//!
//! A [`Dataset`] is an ordered field set with weighted records, loaded either
//! from raw survey rows ([`Dataset::from_grid`]) or from a detected table
//! ([`Dataset::from_table`]). [`crosstab`] counts the records per row and
//! combined column category and derives row-normalized percentages.
//!
//! ```
//! use xtab_core::{crosstab, CrosstabRequest, Dataset, TableAxes};
//! use xtab_detect::{detect_tables, DetectOptions};
//! use xtab_grid::Grid;
//!
//! let grid = Grid::from_csv_str("Q1,,\n,Yes,No\nMale,10,5\nFemale,8,12").unwrap();
//! let tables = detect_tables(&grid, &DetectOptions::default());
//! let table = tables.get("Q1").unwrap();
//!
//! let axes = TableAxes::new("gender-row", vec!["Yes/No".to_string()]);
//! let dataset = Dataset::from_table(table, &axes).unwrap();
//! let result = crosstab(&dataset, &CrosstabRequest::new("gender-row", vec!["Yes/No".to_string()])).unwrap();
//!
//! assert_eq!(result.count("Female", "No"), 12);
//! ```

/// Crosstab requests and results.
pub mod crosstab;
/// Weighted record sets.
pub mod dataset;
/// Error types and result aliases.
pub mod error;

pub use crosstab::{
    crosstab, round2, CrosstabRequest, CrosstabResult, CrosstabRow, RowKind, COLUMN_SEPARATOR,
    TOTAL_ROW_LABEL,
};
pub use dataset::{Dataset, TableAxes};
pub use error::{CoreError, Result};
