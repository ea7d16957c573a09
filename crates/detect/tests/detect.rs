use xtab_detect::{
    build_header_tree, detect_blocks, detect_tables, BlockDetector, DetectError, DetectOptions,
    TableValue,
};
use xtab_grid::Grid;

/// Three stacked tables: a flat one, a two-level one with a total column,
/// and a broken one with no header.
const EXPORT: &str = "\
Survey export 2023,,,,
,,,,
Q1,,,,
,Yes,No,,
Male,10,5,,
Female,8,12,,
,,,,
,,,,
Q2,,,,
,Gender,,Total,
,Male,Female,,
18-34,4,6,10,
35+,3,,3,
,,,,
Q3,,,,
Broken,1,2,,
";

fn grid() -> Grid {
    Grid::from_csv_str(EXPORT).unwrap()
}

#[test]
fn test_blocks_in_stacked_export() {
    let grid = grid();
    let blocks: Vec<_> = detect_blocks(&grid).collect();

    assert_eq!(blocks.len(), 3);

    let q1 = blocks[0].as_ref().unwrap();
    assert_eq!(q1.name, "Q1");
    assert_eq!(q1.name_row, 2);
    assert_eq!(q1.header_rows, 3..4);
    assert_eq!(q1.data_rows, 4..6);
    assert_eq!(q1.cols, 1..3);

    let q2 = blocks[1].as_ref().unwrap();
    assert_eq!(q2.header_rows, 9..11);
    assert_eq!(q2.header_rows.end, q2.data_rows.start);
    assert_eq!(q2.cols, 1..4);

    assert!(matches!(
        &blocks[2],
        Err(DetectError::DetectionFailure { block, .. }) if block == "Q3"
    ));
}

#[test]
fn test_header_invariants_hold_for_every_block() {
    let grid = grid();

    for block in detect_blocks(&grid).filter_map(Result::ok) {
        let tree = build_header_tree(&grid, &block).unwrap();
        assert_eq!(tree.depth(), block.header_rows.len());

        for node in tree.nodes() {
            if node.is_leaf() {
                assert_eq!(node.span.len(), 1);
                assert_eq!(node.level + 1, tree.depth());
            } else {
                let first = tree.node(node.children[0]).unwrap();
                let last = tree.node(*node.children.last().unwrap()).unwrap();
                assert_eq!(first.span.start, node.span.start);
                assert_eq!(last.span.end, node.span.end);
            }
        }
        assert_eq!(tree.leaves().len(), block.cols.len());
    }
}

#[test]
fn test_two_level_table_with_total_column() {
    let detected = detect_tables(&grid(), &DetectOptions::default());

    assert_eq!(detected.names(), vec!["Q1", "Q2"]);
    assert_eq!(detected.failures.len(), 1);

    let q2 = detected.get("Q2").unwrap();
    assert_eq!(
        q2.column_paths(),
        [
            vec!["Gender".to_string(), "Male".to_string()],
            vec!["Gender".to_string(), "Female".to_string()],
            vec!["Total".to_string(), "Total".to_string()],
        ]
    );
    assert_eq!(q2.row_labels(), ["18-34", "35+"]);
    assert_eq!(q2.get("35+", &["Gender", "Female"]), Some(&TableValue::Number(0.0)));
    assert_eq!(q2.get("18-34", &["Total", "Total"]), Some(&TableValue::Number(10.0)));
    assert!(!q2.has_non_numeric());
}

#[test]
fn test_detector_options_apply_to_every_block() {
    let grid = grid();
    let detector = BlockDetector::new(DetectOptions::default().with_max_header_rows(1));
    let names: Vec<String> = detector
        .detect(&grid)
        .filter_map(Result::ok)
        .map(|b| b.name)
        .collect();

    assert_eq!(names, vec!["Q1"]);
}

#[test]
fn test_grid_without_tables() {
    let grid = Grid::from_csv_str("just a title\n\nanother title").unwrap();
    let detected = detect_tables(&grid, &DetectOptions::default());

    assert!(detected.is_empty());
    assert!(detected.failures.is_empty());
}
