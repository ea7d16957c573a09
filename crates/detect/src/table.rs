//! Table models built from detected blocks.

use crate::block::{Block, BlockDetector, DetectOptions};
use crate::error::{DetectError, Result};
use crate::header::{build_header_tree, HeaderTree};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, warn};
use xtab_grid::{format_number, Cell, Grid, GridError};

/// How empty data cells are stored in a [`Table`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingCells {
    /// Store empty cells as `0`.
    #[default]
    Zero,
    /// Leave empty cells out of the table.
    Absent,
}

/// Table model options
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub missing: MissingCells,
}

impl TableOptions {
    /// Set how empty data cells are stored
    #[must_use]
    pub fn with_missing(mut self, missing: MissingCells) -> Self {
        self.missing = missing;
        self
    }
}

/// A data cell value inside a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TableValue {
    Number(f64),
    /// Text that failed numeric parsing, kept verbatim.
    Raw(String),
}

impl TableValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Raw(_) => None,
        }
    }
}

impl std::fmt::Display for TableValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Raw(s) => write!(f, "{s}"),
        }
    }
}

/// One `(row label, column path, value)` triple, in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRecord<'a> {
    pub row_label: &'a str,
    pub column_path: &'a [String],
    pub value: &'a TableValue,
}

/// A detected table: row labels, leaf column paths and numeric cells.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    block: Block,
    header: HeaderTree,
    row_labels: Vec<String>,
    column_paths: Vec<Vec<String>>,
    cells: IndexMap<(usize, usize), TableValue>,
    has_non_numeric: bool,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn header(&self) -> &HeaderTree {
        &self.header
    }

    /// Row labels in data-row order; blanks and duplicates are kept.
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Label path of each leaf column, in column order.
    pub fn column_paths(&self) -> &[Vec<String>] {
        &self.column_paths
    }

    pub fn row_count(&self) -> usize {
        self.row_labels.len()
    }

    pub fn col_count(&self) -> usize {
        self.column_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    /// True when some data cell held text that is not a number.
    pub fn has_non_numeric(&self) -> bool {
        self.has_non_numeric
    }

    /// Value at `(row, col)` by position.
    pub fn value(&self, row: usize, col: usize) -> Option<&TableValue> {
        self.cells.get(&(row, col))
    }

    /// Numeric value at `(row, col)`; absent cells are `0`, raw text fails.
    pub fn numeric_value(&self, row: usize, col: usize) -> std::result::Result<f64, GridError> {
        match self.value(row, col) {
            None => Ok(0.0),
            Some(TableValue::Number(n)) => Ok(*n),
            Some(TableValue::Raw(s)) => Err(GridError::conversion(s.as_str(), "number")),
        }
    }

    /// Value for the first row labelled `row_label` under `column_path`.
    pub fn get<S: AsRef<str>>(&self, row_label: &str, column_path: &[S]) -> Option<&TableValue> {
        let row = self.row_labels.iter().position(|l| l == row_label)?;
        let col = self.column_paths.iter().position(|p| {
            p.len() == column_path.len() && p.iter().zip(column_path).all(|(a, b)| a == b.as_ref())
        })?;
        self.value(row, col)
    }

    /// All stored cells as records, in row-major order.
    pub fn records(&self) -> Vec<TableRecord<'_>> {
        self.cells
            .iter()
            .map(|(&(row, col), value)| TableRecord {
                row_label: &self.row_labels[row],
                column_path: &self.column_paths[col],
                value,
            })
            .collect()
    }
}

/// Build the table model of `block` from its header tree.
pub fn build_table(
    grid: &Grid,
    block: &Block,
    header: HeaderTree,
    options: &TableOptions,
) -> Result<Table> {
    let leaves = header.leaves();
    let mut columns = Vec::with_capacity(leaves.len());
    for &leaf in &leaves {
        if let Some(node) = header.node(leaf) {
            columns.push(node.span.start);
        }
    }
    let column_paths = header.leaf_paths();

    let mut row_labels = Vec::with_capacity(block.data_rows.len());
    let mut cells = IndexMap::new();
    let mut has_non_numeric = false;

    for (row_index, row) in block.data_rows.clone().enumerate() {
        row_labels.push(grid.get(row, 0)?.as_text());

        for (col_index, &col) in columns.iter().enumerate() {
            let value = match grid.get(row, col)? {
                Cell::Empty => match options.missing {
                    MissingCells::Zero => TableValue::Number(0.0),
                    MissingCells::Absent => continue,
                },
                Cell::Number(n) => TableValue::Number(*n),
                Cell::Text(s) => match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => TableValue::Number(n),
                    _ => {
                        has_non_numeric = true;
                        TableValue::Raw(s.clone())
                    }
                },
            };
            cells.insert((row_index, col_index), value);
        }
    }

    Ok(Table {
        name: block.name.clone(),
        block: block.clone(),
        header,
        row_labels,
        column_paths,
        cells,
        has_non_numeric,
    })
}

/// Tables and per-block failures found in one grid.
#[derive(Debug, Default)]
pub struct DetectedTables {
    pub tables: Vec<Table>,
    pub failures: Vec<DetectError>,
}

impl DetectedTables {
    /// True when no table was detected.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// First table with the given name.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name()).collect()
    }

    /// The tables, or [`DetectError::NoTablesFound`] when there are none.
    pub fn into_tables(self) -> Result<Vec<Table>> {
        if self.tables.is_empty() {
            return Err(DetectError::NoTablesFound);
        }
        Ok(self.tables)
    }
}

/// Detect every table in `grid`.
///
/// A block that fails detection is logged and recorded in
/// [`DetectedTables::failures`]; the scan continues with the next block.
pub fn detect_tables(grid: &Grid, options: &DetectOptions) -> DetectedTables {
    let detector = BlockDetector::new(options.clone());
    let mut detected = DetectedTables::default();

    for block in detector.detect(grid) {
        let table = block.and_then(|block| {
            let header = build_header_tree(grid, &block)?;
            build_table(grid, &block, header, &options.table)
        });
        match table {
            Ok(table) => detected.tables.push(table),
            Err(e) => {
                warn!(block = e.block().unwrap_or("?"), "skipping block: {}", e);
                detected.failures.push(e);
            }
        }
    }

    info!(
        grid = grid.name(),
        tables = detected.tables.len(),
        failures = detected.failures.len(),
        "table detection finished"
    );
    detected
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURVEY: &str = "\
Q1,,
,Yes,No
Male,10,5
Female,8,12
,,
Q2,,,,
,Gender,,Age,
,Male,Female,Young,Old
Yes,1,2,3,4
No,5,,7,8
";

    fn detected(csv: &str, options: &DetectOptions) -> DetectedTables {
        detect_tables(&Grid::from_csv_str(csv).unwrap(), options)
    }

    #[test]
    fn test_detect_tables() {
        let tables = detected(SURVEY, &DetectOptions::default());

        assert_eq!(tables.names(), vec!["Q1", "Q2"]);
        assert!(tables.failures.is_empty());

        let q1 = tables.get("Q1").unwrap();
        assert_eq!(q1.row_labels(), ["Male", "Female"]);
        assert_eq!(q1.col_count(), 2);
        assert_eq!(q1.get("Female", &["No"]), Some(&TableValue::Number(12.0)));

        let q2 = tables.get("Q2").unwrap();
        assert_eq!(q2.header().depth(), 2);
        assert_eq!(
            q2.get("Yes", &["Age", "Old"]),
            Some(&TableValue::Number(4.0))
        );
    }

    #[test]
    fn test_missing_cells_policy() {
        let zero = detected(SURVEY, &DetectOptions::default());
        let q2 = zero.get("Q2").unwrap();
        assert_eq!(q2.value(1, 1), Some(&TableValue::Number(0.0)));

        let options = DetectOptions::default()
            .with_table_options(TableOptions::default().with_missing(MissingCells::Absent));
        let absent = detected(SURVEY, &options);
        let q2 = absent.get("Q2").unwrap();
        assert_eq!(q2.value(1, 1), None);
        assert_eq!(q2.numeric_value(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_raw_text_marks_table_non_numeric() {
        let tables = detected("Q,,\n,A,B\nx,1,n/a", &DetectOptions::default());
        let table = tables.get("Q").unwrap();

        assert!(table.has_non_numeric());
        assert_eq!(table.value(0, 1), Some(&TableValue::Raw("n/a".to_string())));
        assert!(matches!(
            table.numeric_value(0, 1),
            Err(GridError::ValueConversion { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_blank_row_labels_kept() {
        let grid = Grid::from_rows(
            "dupes",
            vec![
                vec!["Q".into(), Cell::Empty, Cell::Empty],
                vec![Cell::Empty, "A".into(), "B".into()],
                vec!["x".into(), 1.0.into(), 2.0.into()],
                vec!["x".into(), 3.0.into(), 4.0.into()],
            ],
        );
        let tables = detect_tables(&grid, &DetectOptions::default());
        let table = tables.get("Q").unwrap();

        assert_eq!(table.row_labels(), ["x", "x"]);
        // Lookup by label returns the first matching row
        assert_eq!(table.get("x", &["B"]), Some(&TableValue::Number(2.0)));
        assert_eq!(table.records().len(), 4);
    }

    #[test]
    fn test_failure_does_not_abort_scan() {
        let tables = detected(
            "Broken,,\nrow,1,2\n,,\nQ,,\n,A,B\nx,1,2",
            &DetectOptions::default(),
        );

        assert_eq!(tables.names(), vec!["Q"]);
        assert_eq!(tables.failures.len(), 1);
        assert_eq!(tables.failures[0].block(), Some("Broken"));
    }

    #[test]
    fn test_no_tables_found() {
        let tables = detected(",,\nTitle,,\n,,", &DetectOptions::default());

        assert!(tables.is_empty());
        assert!(matches!(
            tables.into_tables(),
            Err(DetectError::NoTablesFound)
        ));
    }
}
