use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use itertools::Itertools;
use steenroder::{compute_barcodes, Config, Filtration, Mode};

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = run_benchmarks
}
criterion_main!(benches);

/// The 2-skeleton of the simplex on `n` vertices, in order of dimension.
fn skeleton(n: usize) -> Filtration {
    let simplices = (1..=3)
        .flat_map(|r| (0..n).combinations(r))
        .collect::<Vec<_>>();
    Filtration::new(simplices).unwrap()
}

fn run_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("barcodes");
    for n in [8, 12, 16] {
        let f = skeleton(n);
        for mode in [Mode::Absolute, Mode::Relative] {
            let config = Config {
                k: 1,
                mode,
                ..Config::default()
            };
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), n),
                &f,
                |b, f| b.iter(|| compute_barcodes(black_box(f), &config).unwrap()),
            );
        }
    }
    group.finish();
}
