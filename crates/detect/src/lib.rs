//! Embedded table detection for xtab
//!
//! A survey export stacks several cross-tabulations in one [`Grid`], separated
//! by blank rows and labelled with multi-row headers. This crate recovers
//! them in three steps:
//!
//! 1. [`detect_blocks`] finds each block's name, header rows, data rows and
//!    columns.
//! 2. [`build_header_tree`] turns the header rows into a [`HeaderTree`] whose
//!    leaves are addressable by label path.
//! 3. [`build_table`] reads the data rows into a [`Table`].
//!
//! [`detect_tables`] runs all three over a grid, collecting per-block
//! failures instead of stopping at the first one.
//!
//! # Examples
//!
//! ```
//! use xtab_detect::{detect_tables, DetectOptions, TableValue};
//! use xtab_grid::Grid;
//!
//! let grid = Grid::from_csv_str("Q1,,\n,Yes,No\nMale,10,5\nFemale,8,12").unwrap();
//! let detected = detect_tables(&grid, &DetectOptions::default());
//!
//! let q1 = detected.get("Q1").unwrap();
//! assert_eq!(q1.column_paths(), [vec!["Yes".to_string()], vec!["No".to_string()]]);
//! assert_eq!(q1.get("Male", &["No"]), Some(&TableValue::Number(5.0)));
//! ```
//!
//! [`Grid`]: xtab_grid::Grid

mod block;
mod error;
mod header;
mod table;

pub use block::{detect_blocks, Block, BlockDetector, Blocks, DetectOptions};
pub use error::{DetectError, Result};
pub use header::{build_header_tree, HeaderNode, HeaderTree, NodeId};
pub use table::{
    build_table, detect_tables, DetectedTables, MissingCells, Table, TableOptions, TableRecord,
    TableValue,
};
