//! Crosstab computation: counts and row-normalized percentages.

use crate::dataset::Dataset;
use crate::error::{CoreError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Label of the synthetic row holding raw column totals.
pub const TOTAL_ROW_LABEL: &str = "n";

/// Separator between the values of combined column dimensions.
pub const COLUMN_SEPARATOR: &str = ", ";

/// What to cross-tabulate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosstabRequest {
    pub row_dimension: String,
    pub column_dimensions: Vec<String>,
    /// Row categories left out of the result. Set semantics: dropping a
    /// category twice is the same as dropping it once.
    #[serde(default)]
    pub dropped_categories: BTreeSet<String>,
}

impl CrosstabRequest {
    pub fn new(row_dimension: impl Into<String>, column_dimensions: Vec<String>) -> Self {
        Self {
            row_dimension: row_dimension.into(),
            column_dimensions,
            dropped_categories: BTreeSet::new(),
        }
    }

    /// Drop the given row categories
    #[must_use]
    pub fn with_dropped<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dropped_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }
}

/// Kind of a row yielded by [`CrosstabResult::rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A row category with its percentages.
    Category,
    /// The synthetic `n` row with raw column totals.
    Total,
}

/// One display row of a crosstab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosstabRow<'a> {
    pub label: &'a str,
    pub kind: RowKind,
    pub values: Vec<f64>,
}

/// Counts and percentages for one crosstab request.
///
/// Rows and columns keep the order in which categories first appear in the
/// dataset. `counts[r][c]` is the weighted count of row category `r` and
/// column category `c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosstabResult {
    row_dimension: String,
    column_dimensions: Vec<String>,
    row_categories: Vec<String>,
    column_categories: Vec<String>,
    counts: Vec<Vec<u64>>,
    totals_row: Vec<u64>,
    percentages: Vec<Vec<f64>>,
    total_label: String,
}

impl CrosstabResult {
    pub fn row_dimension(&self) -> &str {
        &self.row_dimension
    }

    pub fn column_dimensions(&self) -> &[String] {
        &self.column_dimensions
    }

    pub fn row_categories(&self) -> &[String] {
        &self.row_categories
    }

    /// Combined column categories (values joined with `", "`).
    pub fn column_categories(&self) -> &[String] {
        &self.column_categories
    }

    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Column-wise sums of the counts.
    pub fn totals_row(&self) -> &[u64] {
        &self.totals_row
    }

    /// Label of the totals row: [`TOTAL_ROW_LABEL`], suffixed with
    /// `" (total)"` while it would clash with a row category.
    pub fn total_label(&self) -> &str {
        &self.total_label
    }

    /// Row-normalized percentages at full precision.
    pub fn percentages(&self) -> &[Vec<f64>] {
        &self.percentages
    }

    /// Count for a pair of categories, `0` when either is unknown.
    pub fn count(&self, row: &str, col: &str) -> u64 {
        self.position(row, col)
            .map_or(0, |(r, c)| self.counts[r][c])
    }

    /// Percentage for a pair of categories, if both exist.
    pub fn percentage(&self, row: &str, col: &str) -> Option<f64> {
        self.position(row, col).map(|(r, c)| self.percentages[r][c])
    }

    fn position(&self, row: &str, col: &str) -> Option<(usize, usize)> {
        let r = self.row_categories.iter().position(|x| x == row)?;
        let c = self.column_categories.iter().position(|x| x == col)?;
        Some((r, c))
    }

    /// Category rows with percentages, followed by the `n` totals row.
    pub fn rows(&self) -> Vec<CrosstabRow<'_>> {
        let mut rows: Vec<CrosstabRow<'_>> = self
            .row_categories
            .iter()
            .zip(&self.percentages)
            .map(|(label, values)| CrosstabRow {
                label,
                kind: RowKind::Category,
                values: values.clone(),
            })
            .collect();
        rows.push(CrosstabRow {
            label: &self.total_label,
            kind: RowKind::Total,
            values: self.totals_row.iter().map(|&n| n as f64).collect(),
        });
        rows
    }
}

/// Round to two decimal places for display.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the crosstab of `request` over `dataset`.
///
/// Every dimension is checked before any record is read, so a failing
/// request never yields a partial result.
pub fn crosstab(dataset: &Dataset, request: &CrosstabRequest) -> Result<CrosstabResult> {
    let row_index = dataset
        .field_index(&request.row_dimension)
        .ok_or_else(|| CoreError::field_not_found(&request.row_dimension))?;
    let column_indices = request
        .column_dimensions
        .iter()
        .map(|field| {
            dataset
                .field_index(field)
                .ok_or_else(|| CoreError::field_not_found(field))
        })
        .collect::<Result<Vec<_>>>()?;
    if column_indices.is_empty() {
        return Err(CoreError::InvalidRequest(
            "at least one column dimension is required".to_string(),
        ));
    }
    if let Some(raw) = dataset.first_non_numeric() {
        return Err(CoreError::value_conversion(raw, "number"));
    }

    debug!(
        row = %request.row_dimension,
        columns = ?request.column_dimensions,
        dropped = request.dropped_categories.len(),
        records = dataset.len(),
        "computing crosstab"
    );

    let mut rows: IndexSet<String> = IndexSet::new();
    let mut cols: IndexSet<String> = IndexSet::new();
    let mut cells: IndexMap<(usize, usize), u64> = IndexMap::new();

    for (values, weight) in dataset.records() {
        let row_value = values[row_index].as_text();
        if request.dropped_categories.contains(&row_value) {
            continue;
        }
        let weight = integral_weight(weight)?;
        let col_value = column_indices
            .iter()
            .map(|&i| values[i].as_text())
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);

        let (r, _) = rows.insert_full(row_value);
        let (c, _) = cols.insert_full(col_value);
        *cells.entry((r, c)).or_insert(0) += weight;
    }

    if rows.is_empty() {
        return Err(CoreError::EmptyResult {
            row_dimension: request.row_dimension.clone(),
        });
    }

    let mut counts = vec![vec![0u64; cols.len()]; rows.len()];
    for ((r, c), n) in cells {
        counts[r][c] = n;
    }

    let mut totals_row = vec![0u64; cols.len()];
    for row in &counts {
        for (total, n) in totals_row.iter_mut().zip(row) {
            *total += n;
        }
    }

    let percentages = counts
        .iter()
        .map(|row| {
            let row_total: u64 = row.iter().sum();
            row.iter()
                .map(|&n| {
                    if row_total == 0 {
                        0.0
                    } else {
                        100.0 * n as f64 / row_total as f64
                    }
                })
                .collect()
        })
        .collect();

    info!(
        rows = rows.len(),
        columns = cols.len(),
        "crosstab {} vs {}",
        request.row_dimension,
        request.column_dimensions.join(" ")
    );

    let mut total_label = TOTAL_ROW_LABEL.to_string();
    while rows.contains(&total_label) {
        total_label.push_str(" (total)");
    }

    Ok(CrosstabResult {
        total_label,
        row_dimension: request.row_dimension.clone(),
        column_dimensions: request.column_dimensions.clone(),
        row_categories: rows.into_iter().collect(),
        column_categories: cols.into_iter().collect(),
        counts,
        totals_row,
        percentages,
    })
}

fn integral_weight(weight: f64) -> Result<u64> {
    if weight.is_finite() && weight >= 0.0 && weight.fract() == 0.0 {
        Ok(weight as u64)
    } else {
        Err(CoreError::value_conversion(
            weight.to_string(),
            "non-negative whole count",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtab_grid::{Cell, Grid};

    fn respondents() -> Dataset {
        Dataset::from_grid(
            &Grid::from_csv_str(
                "gender,answer,region\n\
                 Male,Yes,North\n\
                 Male,Yes,South\n\
                 Female,No,North\n\
                 Male,No,North\n\
                 Female,Yes,South\n\
                 Other,Yes,South",
            )
            .unwrap(),
        )
        .unwrap()
    }

    fn request(row: &str, cols: &[&str]) -> CrosstabRequest {
        CrosstabRequest::new(row, cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_counts_and_first_appearance_order() {
        let result = crosstab(&respondents(), &request("gender", &["answer"])).unwrap();

        assert_eq!(result.row_categories(), ["Male", "Female", "Other"]);
        assert_eq!(result.column_categories(), ["Yes", "No"]);
        assert_eq!(result.counts(), [vec![2, 1], vec![1, 1], vec![1, 0]]);
        assert_eq!(result.totals_row(), [4, 2]);
        assert_eq!(result.count("Male", "Yes"), 2);
        assert_eq!(result.count("Nobody", "Yes"), 0);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let result = crosstab(&respondents(), &request("gender", &["answer"])).unwrap();

        for row in result.percentages() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 100.0).abs() < 0.01);
        }
        assert_eq!(round2(result.percentage("Male", "Yes").unwrap()), 66.67);
    }

    #[test]
    fn test_combined_column_dimensions() {
        let result =
            crosstab(&respondents(), &request("gender", &["answer", "region"])).unwrap();

        assert_eq!(
            result.column_categories(),
            ["Yes, North", "Yes, South", "No, North"]
        );
        assert_eq!(result.count("Female", "Yes, South"), 1);
    }

    #[test]
    fn test_rows_end_with_total_row() {
        let result = crosstab(&respondents(), &request("gender", &["answer"])).unwrap();
        let rows = result.rows();

        assert_eq!(rows.len(), 4);
        let last = rows.last().unwrap();
        assert_eq!(last.label, TOTAL_ROW_LABEL);
        assert_eq!(last.kind, RowKind::Total);
        assert_eq!(last.values, vec![4.0, 2.0]);
        assert!(rows[..3].iter().all(|r| r.kind == RowKind::Category));
    }

    #[test]
    fn test_total_label_avoids_row_category() {
        let dataset = Dataset::from_grid(
            &Grid::from_csv_str("size,answer\nn,Yes\nn (total),No\nm,No").unwrap(),
        )
        .unwrap();
        let result = crosstab(&dataset, &request("size", &["answer"])).unwrap();
        let rows = result.rows();

        assert_eq!(result.total_label(), "n (total) (total)");
        assert_eq!(rows[0].label, "n");
        assert_eq!(rows[0].kind, RowKind::Category);
        assert_eq!(rows[3].label, "n (total) (total)");
        assert_eq!(rows[3].kind, RowKind::Total);
    }

    #[test]
    fn test_dropped_categories() {
        let once = request("gender", &["answer"]).with_dropped(["Other"]);
        let twice = request("gender", &["answer"]).with_dropped(["Other", "Other"]);

        let a = crosstab(&respondents(), &once).unwrap();
        let b = crosstab(&respondents(), &twice).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.row_categories(), ["Male", "Female"]);
        assert_eq!(a.totals_row(), [3, 2]);
    }

    #[test]
    fn test_all_rows_dropped() {
        let req = request("gender", &["answer"]).with_dropped(["Male", "Female", "Other"]);

        assert!(matches!(
            crosstab(&respondents(), &req),
            Err(CoreError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_unknown_dimensions() {
        let dataset = respondents();

        let err = crosstab(&dataset, &request("age", &["Unknown"])).unwrap_err();
        assert!(matches!(err, CoreError::FieldNotFound { field } if field == "age"));

        let err = crosstab(&dataset, &request("gender", &["answer", "Unknown"])).unwrap_err();
        assert!(matches!(err, CoreError::FieldNotFound { field } if field == "Unknown"));

        assert!(matches!(
            crosstab(&dataset, &request("gender", &[])),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_zero_row_total_gives_zero_percentages() {
        let mut dataset =
            Dataset::new("weights", vec!["row".to_string(), "col".to_string()]).unwrap();
        dataset.push(vec![Cell::from("a"), Cell::from("x")], 0.0);
        dataset.push(vec![Cell::from("b"), Cell::from("x")], 3.0);

        let result = crosstab(&dataset, &request("row", &["col"])).unwrap();

        assert_eq!(result.percentages()[0], vec![0.0]);
        assert!(result.percentages()[0].iter().all(|p| !p.is_nan()));
        assert_eq!(result.percentages()[1], vec![100.0]);
    }

    #[test]
    fn test_fractional_weight_is_conversion_error() {
        let mut dataset =
            Dataset::new("weights", vec!["row".to_string(), "col".to_string()]).unwrap();
        dataset.push(vec![Cell::from("a"), Cell::from("x")], 1.5);

        assert!(matches!(
            crosstab(&dataset, &request("row", &["col"])),
            Err(CoreError::Grid(xtab_grid::GridError::ValueConversion { .. }))
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new("empty", vec!["a".to_string(), "b".to_string()]).unwrap();

        assert!(matches!(
            crosstab(&dataset, &request("a", &["b"])),
            Err(CoreError::EmptyResult { .. })
        ));
    }

    #[test]
    fn test_request_serde_defaults_dropped() {
        let req: CrosstabRequest =
            serde_json::from_str(r#"{"row_dimension":"a","column_dimensions":["b"]}"#).unwrap();

        assert!(req.dropped_categories.is_empty());
    }
}
