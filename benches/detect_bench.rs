use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xtab_detect::{detect_blocks, detect_tables, DetectOptions};
use xtab_grid::{Cell, Grid};

/// A grid of `blocks` stacked two-level tables, each with `rows` data rows.
fn stacked_grid(blocks: usize, rows: usize) -> Grid {
    let mut data: Vec<Vec<Cell>> = Vec::new();
    for b in 0..blocks {
        data.push(vec![format!("Q{b}").into()]);
        data.push(vec![
            Cell::Empty,
            "Gender".into(),
            Cell::Empty,
            "Age".into(),
            Cell::Empty,
        ]);
        data.push(vec![
            Cell::Empty,
            "Male".into(),
            "Female".into(),
            "Young".into(),
            "Old".into(),
        ]);
        for r in 0..rows {
            let n = (r * 7 + b) as f64;
            data.push(vec![
                format!("answer {r}").into(),
                n.into(),
                (n + 1.0).into(),
                (n + 2.0).into(),
                (n + 3.0).into(),
            ]);
        }
        data.push(Vec::new());
    }
    Grid::from_rows("bench", data)
}

fn bench_detect_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_blocks");

    for blocks in [10, 100, 1000].iter() {
        let grid = stacked_grid(*blocks, 10);
        group.bench_with_input(BenchmarkId::new("blocks", blocks), blocks, |b, _| {
            b.iter(|| detect_blocks(black_box(&grid)).count())
        });
    }

    group.finish();
}

fn bench_detect_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_tables");
    let options = DetectOptions::default();

    for rows in [10, 100, 1000].iter() {
        let grid = stacked_grid(20, *rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), rows, |b, _| {
            b.iter(|| detect_tables(black_box(&grid), &options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detect_blocks, bench_detect_tables);
criterion_main!(benches);
