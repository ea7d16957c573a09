use crate::cell::Cell;
use crate::error::{GridError, Result};

/// An immutable, rectangular grid of cells (row-major storage).
///
/// Rows shorter than the widest row are padded with [`Cell::Empty`] on
/// construction, so every row has exactly [`Grid::col_count`] cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    name: String,
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl Grid {
    /// Create an empty grid
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grid from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<Cell>>(data: Vec<Vec<T>>) -> Self {
        let rows = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::from_rows("Sheet1", rows)
    }

    /// Create a named grid from rows of cells, padding ragged rows
    #[must_use]
    pub fn from_rows(name: &str, mut rows: Vec<Vec<Cell>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, Cell::Empty);
        }

        Grid {
            name: name.to_string(),
            rows,
            cols,
        }
    }

    /// Get the grid name (sheet name or file stem)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Check if the grid has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a cell by row and column index
    pub fn get(&self, row: usize, col: usize) -> Result<&Cell> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(GridError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell, treating anything outside the grid as empty
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&[Cell]> {
        self.rows
            .get(index)
            .map(Vec::as_slice)
            .ok_or(GridError::RowIndexOutOfBounds {
                index,
                count: self.row_count(),
            })
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// A row is a separator when every cell in it is empty.
    ///
    /// Rows past the end of the grid count as separators.
    #[must_use]
    pub fn is_separator_row(&self, index: usize) -> bool {
        self.rows
            .get(index)
            .map_or(true, |row| row.iter().all(Cell::is_empty))
    }
}
