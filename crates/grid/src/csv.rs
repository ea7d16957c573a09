use crate::cell::Cell;
use crate::error::Result;
use crate::grid::Grid;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV reader options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether to infer numbers from fields (default: true)
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

impl Grid {
    /// Load a grid from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_with_options(path, CsvOptions::default())
    }

    /// Load a grid from a CSV file with custom options
    pub fn from_csv_with_options<P: AsRef<Path>>(path: P, options: CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_csv_reader(&name, reader, &options)
    }

    /// Load a grid from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_str_with_options(content, CsvOptions::default())
    }

    /// Load a grid from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: CsvOptions) -> Result<Self> {
        Self::from_csv_reader("Sheet1", content.as_bytes(), &options)
    }

    /// Load a grid from a reader.
    ///
    /// Records may have different lengths; the grid pads them to a rectangle.
    /// Blank lines are kept as empty rows so they still separate blocks.
    pub fn from_csv_reader<R: Read>(name: &str, reader: R, options: &CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // Header rows are part of the grid
            .flexible(true)
            .from_reader(reader);

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut next_line = 1;

        for result in csv_reader.records() {
            let record = result?;
            if let Some(position) = record.position() {
                // The reader drops blank lines; restore them
                for _ in next_line..position.line() {
                    rows.push(Vec::new());
                }
                let embedded: u64 = record.iter().map(|f| f.matches('\n').count() as u64).sum();
                next_line = position.line() + 1 + embedded;
            }
            let row: Vec<Cell> = record
                .iter()
                .map(|field| {
                    if options.infer_types {
                        Cell::parse(field)
                    } else {
                        Cell::from(field)
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(Grid::from_rows(name, rows))
    }
}
