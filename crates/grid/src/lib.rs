//! Rectangular cell grids for xtab
//!
//! A [`Grid`] is the raw, immutable matrix of cells loaded from a tabular
//! export. Cells are a closed variant ([`Cell::Empty`], [`Cell::Number`],
//! [`Cell::Text`]) with total conversions: [`Cell::as_number`] fails instead
//! of coercing text.
//!
//! # Examples
//!
//! ```
//! use xtab_grid::{Cell, Grid};
//!
//! let grid = Grid::from_csv_str("Q1,,\n,Yes,No\nMale,10,5").unwrap();
//!
//! assert_eq!(grid.row_count(), 3);
//! assert_eq!(grid.col_count(), 3);
//! assert_eq!(grid.get(2, 1).unwrap(), &Cell::Number(10.0));
//! ```
//!
//! ## Loading from a file
//!
//! ```no_run
//! use xtab_grid::Grid;
//!
//! let csv = Grid::open("export.csv").unwrap();
//! let xlsx = Grid::open("export.xlsx").unwrap();
//! ```

mod cell;
mod csv;
mod error;
mod grid;
mod xlsx;

/// Re-export cell type.
pub use cell::{format_number, Cell};
/// Re-export CSV options.
pub use self::csv::CsvOptions;
/// Re-export grid error types.
pub use error::{GridError, Result};
/// Re-export grid type.
pub use grid::Grid;
/// Re-export workbook read options.
pub use xlsx::XlsxReadOptions;
