//! Block detection: finding the embedded tables stacked inside one grid.
//!
//! A grid holds several independent tables separated by blank rows. Each
//! table starts with a *name row* (first cell non-empty, next row not blank),
//! followed by one or more *header rows* (first cell empty) and then *data
//! rows* (first cell holds the row label) until the next separator row.
//!
//! ```text
//! Q1     |       |        <- name row
//!        | Yes   | No     <- header row(s)
//! Male   | 10    | 5      <- data rows
//! Female | 8     | 12
//!        |       |        <- separator
//! ```

use crate::error::{DetectError, Result};
use crate::table::TableOptions;
use serde::Serialize;
use std::ops::Range;
use tracing::debug;
use xtab_grid::Grid;

/// Row and column extents of one embedded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Declared name (first cell of the name row).
    pub name: String,
    /// Grid row holding the name.
    pub name_row: usize,
    /// Header rows, immediately after the name row.
    pub header_rows: Range<usize>,
    /// Data rows, immediately after the header rows. May be empty.
    pub data_rows: Range<usize>,
    /// Header/data columns; always starts at column 1.
    pub cols: Range<usize>,
}

impl Block {
    /// Number of header rows (the depth of the header tree)
    #[must_use]
    pub fn header_depth(&self) -> usize {
        self.header_rows.len()
    }

    /// Check if the block has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data_rows.is_empty()
    }
}

/// Detection options
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Blocks with fewer data rows are reported as detection failures
    pub min_data_rows: usize,
    /// Blocks with more header rows are reported as detection failures
    pub max_header_rows: Option<usize>,
    /// Options for building table models
    pub table: TableOptions,
}

impl DetectOptions {
    /// Set the minimum number of data rows
    #[must_use]
    pub fn with_min_data_rows(mut self, min_data_rows: usize) -> Self {
        self.min_data_rows = min_data_rows;
        self
    }

    /// Set the maximum number of header rows
    #[must_use]
    pub fn with_max_header_rows(mut self, max_header_rows: usize) -> Self {
        self.max_header_rows = Some(max_header_rows);
        self
    }

    /// Set the table model options
    #[must_use]
    pub fn with_table_options(mut self, table: TableOptions) -> Self {
        self.table = table;
        self
    }
}

/// Detects blocks in a grid.
#[derive(Debug, Clone, Default)]
pub struct BlockDetector {
    options: DetectOptions,
}

impl BlockDetector {
    pub fn new(options: DetectOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectOptions {
        &self.options
    }

    /// Lazily scan `grid` for blocks.
    pub fn detect<'a>(&self, grid: &'a Grid) -> Blocks<'a> {
        Blocks {
            grid,
            min_data_rows: self.options.min_data_rows,
            max_header_rows: self.options.max_header_rows,
            row: 0,
        }
    }
}

/// Lazily scan a grid for blocks with default options.
pub fn detect_blocks(grid: &Grid) -> Blocks<'_> {
    BlockDetector::default().detect(grid)
}

/// Lazy iterator over the blocks of a grid.
///
/// Each item is either a block or the failure for that block; a failure never
/// ends the iteration, scanning resumes at the next separator row.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    grid: &'a Grid,
    min_data_rows: usize,
    max_header_rows: Option<usize>,
    row: usize,
}

impl Iterator for Blocks<'_> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let grid = self.grid;
        let rows = grid.row_count();

        loop {
            // Consecutive separators collapse into one boundary
            while self.row < rows && grid.is_separator_row(self.row) {
                self.row += 1;
            }
            if self.row >= rows {
                return None;
            }

            let start = self.row;
            if grid.cell(start, 0).is_empty() {
                debug!(row = start, "skipping row without a name cell");
                self.row = start + 1;
                continue;
            }

            let end = next_separator(grid, start);
            self.row = end;
            if end == start + 1 {
                debug!(row = start, "skipping lone title row");
                continue;
            }

            return Some(self.scan_block(start, end));
        }
    }
}

impl Blocks<'_> {
    /// Resolve the extents of the block whose name row is `start` and whose
    /// region ends (exclusive) at `end`.
    fn scan_block(&self, start: usize, end: usize) -> Result<Block> {
        let grid = self.grid;
        let name = grid.cell(start, 0).as_text();

        // Header rows end at the first row whose first cell is non-empty
        let header_start = start + 1;
        let header_end = (header_start..end)
            .find(|&r| !grid.cell(r, 0).is_empty())
            .unwrap_or(end);

        if header_end == header_start {
            return Err(DetectError::failure(
                name,
                header_start,
                "row after the name row already holds a row label, header is empty",
            ));
        }
        if let Some(max) = self.max_header_rows {
            if header_end - header_start > max {
                return Err(DetectError::failure(
                    name,
                    header_start,
                    format!(
                        "{} header rows exceed the limit of {max}",
                        header_end - header_start
                    ),
                ));
            }
        }

        let cols = column_range(grid, header_start..header_end);
        if cols.is_empty() {
            return Err(DetectError::failure(
                name,
                header_start,
                "no header label in column 1",
            ));
        }

        let data_rows = header_end..end;
        if data_rows.len() < self.min_data_rows {
            return Err(DetectError::failure(
                name,
                header_end,
                format!(
                    "{} data rows, at least {} required",
                    data_rows.len(),
                    self.min_data_rows
                ),
            ));
        }

        debug!(
            block = %name,
            header = ?(header_start..header_end),
            data = ?data_rows,
            cols = ?cols,
            "detected block"
        );

        Ok(Block {
            name,
            name_row: start,
            header_rows: header_start..header_end,
            data_rows,
            cols,
        })
    }
}

/// First separator row after `start`, or the grid's row count.
fn next_separator(grid: &Grid, start: usize) -> usize {
    (start + 1..grid.row_count())
        .find(|&r| grid.is_separator_row(r))
        .unwrap_or(grid.row_count())
}

/// Maximal run of header columns starting at column 1.
///
/// A column belongs to the run when its top header cell is non-empty, or when
/// it is blank there but sits under a spanning label (a lower header row is
/// non-empty in that column). For a single header row this is exactly the
/// run of non-empty cells.
fn column_range(grid: &Grid, header_rows: Range<usize>) -> Range<usize> {
    let end = (1..grid.col_count())
        .find(|&c| header_rows.clone().all(|r| grid.cell(r, c).is_empty()))
        .unwrap_or(grid.col_count());
    1..end.max(1)
}
