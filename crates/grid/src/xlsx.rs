use crate::cell::Cell;
use crate::error::{GridError, Result};
use crate::grid::Grid;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Options for reading spreadsheet workbooks (xlsx, xls, ods)
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Worksheet to read; the first worksheet when unset
    pub sheet_name: Option<String>,
}

impl XlsxReadOptions {
    /// Select the worksheet to read
    #[must_use]
    pub fn with_sheet(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }
}

/// Convert calamine Data to a Cell
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#ERROR: {e:?}")),
    }
}

fn workbook_error(e: impl std::fmt::Display) -> GridError {
    GridError::Workbook(e.to_string())
}

impl Grid {
    /// Load the first worksheet of a workbook
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_xlsx_with_options(path, &XlsxReadOptions::default())
    }

    /// Load a worksheet of a workbook with options.
    ///
    /// The grid keeps the sheet's absolute coordinates: leading empty rows and
    /// columns that the workbook omits are restored as empty cells, so column 0
    /// of the grid is always column A.
    pub fn from_xlsx_with_options<P: AsRef<Path>>(
        path: P,
        options: &XlsxReadOptions,
    ) -> Result<Self> {
        let mut workbook = open_workbook_auto(path.as_ref()).map_err(workbook_error)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match &options.sheet_name {
            Some(name) if sheet_names.contains(name) => name.clone(),
            Some(name) => return Err(GridError::SheetNotFound { name: name.clone() }),
            None => match sheet_names.first() {
                Some(name) => name.clone(),
                None => return Ok(Grid::new()),
            },
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(workbook_error)?;

        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(data_to_cell));
            rows.push(cells);
        }

        Ok(Grid::from_rows(&sheet_name, rows))
    }

    /// Load a grid from a file, choosing the reader by extension.
    ///
    /// `.xlsx`, `.xlsm`, `.xls` and `.ods` go through the workbook reader,
    /// `.tsv` is tab-separated, everything else is read as CSV.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Self::from_xlsx(path),
            "tsv" => Self::from_csv_with_options(path, crate::CsvOptions::tsv()),
            _ => Self::from_csv(path),
        }
    }
}
