use xtab_core::{crosstab, round2, CoreError, CrosstabRequest, Dataset, RowKind, TableAxes};
use xtab_detect::{detect_tables, DetectOptions};
use xtab_grid::{Cell, Grid};

fn q1_grid() -> Grid {
    Grid::from_data(vec![
        vec![Cell::from("Q1"), Cell::Empty, Cell::Empty],
        vec![Cell::Empty, Cell::from("Yes"), Cell::from("No")],
        vec![Cell::from("Male"), Cell::from(10), Cell::from(5)],
        vec![Cell::from("Female"), Cell::from(8), Cell::from(12)],
        vec![Cell::Empty, Cell::Empty, Cell::Empty],
    ])
}

fn q1_dataset() -> Dataset {
    let detected = detect_tables(&q1_grid(), &DetectOptions::default());
    let table = detected.get("Q1").unwrap();
    let axes = TableAxes::new("gender-row", vec!["Yes/No".to_string()]);
    Dataset::from_table(table, &axes).unwrap()
}

fn q1_request() -> CrosstabRequest {
    CrosstabRequest::new("gender-row", vec!["Yes/No".to_string()])
}

#[test]
fn test_q1_counts_and_percentages() {
    let result = crosstab(&q1_dataset(), &q1_request()).unwrap();

    assert_eq!(result.row_categories(), ["Male", "Female"]);
    assert_eq!(result.column_categories(), ["Yes", "No"]);
    assert_eq!(result.count("Male", "Yes"), 10);
    assert_eq!(result.count("Male", "No"), 5);
    assert_eq!(result.count("Female", "Yes"), 8);
    assert_eq!(result.count("Female", "No"), 12);

    let pct = |r, c| round2(result.percentage(r, c).unwrap());
    assert_eq!(pct("Male", "Yes"), 66.67);
    assert_eq!(pct("Male", "No"), 33.33);
    assert_eq!(pct("Female", "Yes"), 40.0);
    assert_eq!(pct("Female", "No"), 60.0);

    let rows = result.rows();
    assert_eq!(rows.last().unwrap().kind, RowKind::Total);
    assert_eq!(rows.last().unwrap().values, vec![18.0, 17.0]);
}

#[test]
fn test_q1_unknown_column_dimension() {
    let request = CrosstabRequest::new("gender-row", vec!["Unknown".to_string()]);

    match crosstab(&q1_dataset(), &request) {
        Err(CoreError::FieldNotFound { field }) => assert_eq!(field, "Unknown"),
        other => panic!("expected FieldNotFound, got {other:?}"),
    }
}

#[test]
fn test_duplicate_row_labels_are_summed() {
    let grid = Grid::from_csv_str("Q,,\n,Yes,No\nMale,1,2\nMale,3,4").unwrap();
    let detected = detect_tables(&grid, &DetectOptions::default());
    let table = detected.get("Q").unwrap();
    assert_eq!(table.row_count(), 2);

    let dataset = Dataset::from_table(table, &TableAxes::for_table(table)).unwrap();
    let request = CrosstabRequest::new("row", vec!["level_0".to_string()]);
    let result = crosstab(&dataset, &request).unwrap();

    assert_eq!(result.row_categories(), ["Male"]);
    assert_eq!(result.count("Male", "Yes"), 4);
    assert_eq!(result.count("Male", "No"), 6);
}

#[test]
fn test_two_level_table_combines_levels() {
    let grid = Grid::from_csv_str(
        "Q2,,,,\n,Gender,,Age,\n,Male,Female,Young,Old\nYes,1,2,3,4\nNo,5,6,7,8",
    )
    .unwrap();
    let detected = detect_tables(&grid, &DetectOptions::default());
    let table = detected.get("Q2").unwrap();
    let dataset = Dataset::from_table(table, &TableAxes::for_table(table)).unwrap();

    let both = CrosstabRequest::new("row", vec!["level_0".to_string(), "level_1".to_string()]);
    let result = crosstab(&dataset, &both).unwrap();
    assert_eq!(
        result.column_categories(),
        ["Gender, Male", "Gender, Female", "Age, Young", "Age, Old"]
    );

    let top = CrosstabRequest::new("row", vec!["level_0".to_string()]);
    let result = crosstab(&dataset, &top).unwrap();
    assert_eq!(result.count("Yes", "Gender"), 3);
    assert_eq!(result.count("No", "Age"), 15);
}

#[test]
fn test_non_numeric_table_fails_at_crosstab() {
    let grid = Grid::from_csv_str("Q,,\n,Yes,No\nMale,1,lots").unwrap();
    let detected = detect_tables(&grid, &DetectOptions::default());
    let table = detected.get("Q").unwrap();
    let dataset = Dataset::from_table(table, &TableAxes::for_table(table)).unwrap();

    let request = CrosstabRequest::new("row", vec!["level_0".to_string()]);
    let err = crosstab(&dataset, &request).unwrap_err();

    assert!(err.to_string().contains("lots"));
}
