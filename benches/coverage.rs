use criterion::{Criterion, black_box, criterion_group, criterion_main};
use radio_coverage::coverage::{CoverageEngine, EngineConfig};
use radio_coverage::grid::Grid;
use radio_coverage::physics::models::{cost235_in_leaf, egli};

fn coverage_benchmark(c: &mut Criterion) {
    let (rows, cols) = (60, 60);

    let mut engine = CoverageEngine::new(EngineConfig::default());
    engine
        .add_land_cover(Grid::filled(rows, cols, 0.7), egli)
        .unwrap();
    engine
        .add_land_cover(Grid::filled(rows, cols, 0.3), cost235_in_leaf)
        .unwrap();

    let mut mask = Grid::zeros(rows, cols);
    mask.set(30, 30, 1.0);
    mask.set(10, 45, 1.0);
    mask.set(50, 12, 1.0);

    c.bench_function("run_merged_coverage", |b| {
        b.iter(|| {
            engine
                .run(black_box(&mask), black_box(Some(1000.0)))
                .unwrap()
        })
    });

    c.bench_function("single_source_fill", |b| {
        b.iter(|| engine.fill(black_box(30), black_box(30), black_box(None)).unwrap())
    });
}

criterion_group!(benches, coverage_benchmark);
criterion_main!(benches);
