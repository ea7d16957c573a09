//! Weighted record sets that crosstabs run on.

use crate::error::{CoreError, Result};
use indexmap::IndexSet;
use tracing::debug;
use xtab_detect::{Table, TableValue};
use xtab_grid::{Cell, Grid};

/// Field names given to the axes of a detected [`Table`].
///
/// The row axis names the row labels; one column axis name is needed per
/// header level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAxes {
    pub row: String,
    pub columns: Vec<String>,
}

impl TableAxes {
    pub fn new(row: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            row: row.into(),
            columns,
        }
    }

    /// Default axis names for `table`: `row`, then `level_0`, `level_1`, ...
    pub fn for_table(table: &Table) -> Self {
        Self {
            row: "row".to_string(),
            columns: (0..table.header().depth())
                .map(|k| format!("level_{k}"))
                .collect(),
        }
    }
}

/// An ordered field set plus weighted records.
///
/// Loaded from raw survey rows every record has weight 1. Built from a
/// detected table, each stored cell becomes one record weighted by the
/// cell's count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    name: String,
    fields: Vec<String>,
    records: Vec<Vec<Cell>>,
    weights: Vec<f64>,
    first_raw: Option<String>,
}

impl Dataset {
    /// Create an empty dataset with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Result<Self> {
        let mut seen = IndexSet::new();
        for field in &fields {
            if !seen.insert(field.as_str()) {
                return Err(CoreError::DuplicateField(field.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            fields,
            ..Self::default()
        })
    }

    /// Append a record; missing trailing values are empty.
    pub fn push(&mut self, mut values: Vec<Cell>, weight: f64) {
        values.resize(self.fields.len(), Cell::Empty);
        self.records.push(values);
        self.weights.push(weight);
    }

    /// Build a dataset from raw rows: the first grid row names the fields.
    ///
    /// Blank field names become `column_<index>` and repeated names get a
    /// `_<n>` suffix (`Wave`, `Wave_1`); blank rows are skipped.
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let Some(header) = grid.rows().next() else {
            return Self::new(grid.name(), Vec::new());
        };
        let mut seen = IndexSet::new();
        let fields = header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let base = match cell {
                    Cell::Empty => format!("column_{i}"),
                    other => other.as_text(),
                };
                let mut field = base.clone();
                let mut suffix = 1;
                while seen.contains(&field) {
                    field = format!("{base}_{suffix}");
                    suffix += 1;
                }
                if field != base {
                    debug!(column = i, field = %field, "renamed repeated field");
                }
                seen.insert(field.clone());
                field
            })
            .collect();

        let mut dataset = Self::new(grid.name(), fields)?;
        for (index, row) in grid.rows().enumerate().skip(1) {
            if grid.is_separator_row(index) {
                debug!(row = index, "skipping blank record");
                continue;
            }
            dataset.push(row.to_vec(), 1.0);
        }
        Ok(dataset)
    }

    /// Build a dataset from a detected table.
    ///
    /// Every stored cell becomes a record `[row label, path...]` weighted by
    /// the cell value. A table holding non-numeric cells still loads; the
    /// crosstab over it fails.
    pub fn from_table(table: &Table, axes: &TableAxes) -> Result<Self> {
        let depth = table.header().depth();
        if axes.columns.len() != depth {
            return Err(CoreError::InvalidRequest(format!(
                "table '{}' has {depth} header levels but {} column axes were named",
                table.name(),
                axes.columns.len()
            )));
        }

        let mut fields = Vec::with_capacity(depth + 1);
        fields.push(axes.row.clone());
        fields.extend(axes.columns.iter().cloned());
        let mut dataset = Self::new(table.name(), fields)?;

        for record in table.records() {
            let mut values = Vec::with_capacity(depth + 1);
            values.push(Cell::Text(record.row_label.to_string()));
            values.extend(record.column_path.iter().map(|l| Cell::Text(l.clone())));

            let weight = match record.value {
                TableValue::Number(n) => *n,
                TableValue::Raw(raw) => {
                    dataset.first_raw.get_or_insert_with(|| raw.clone());
                    0.0
                }
            };
            dataset.push(values, weight);
        }
        Ok(dataset)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field names in order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Position of `field`, if present.
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with their weights.
    pub fn records(&self) -> impl Iterator<Item = (&[Cell], f64)> {
        self.records
            .iter()
            .zip(&self.weights)
            .map(|(r, &w)| (r.as_slice(), w))
    }

    /// True when the source table held non-numeric cells.
    pub fn has_non_numeric(&self) -> bool {
        self.first_raw.is_some()
    }

    /// The first non-numeric source cell, if any.
    pub fn first_non_numeric(&self) -> Option<&str> {
        self.first_raw.as_deref()
    }

    /// Distinct values of `field` as text, in order of first appearance.
    pub fn categories(&self, field: &str) -> Result<Vec<String>> {
        let index = self
            .field_index(field)
            .ok_or_else(|| CoreError::field_not_found(field))?;
        let categories: IndexSet<String> = self
            .records
            .iter()
            .map(|r| r[index].as_text())
            .collect();
        Ok(categories.into_iter().collect())
    }
}
