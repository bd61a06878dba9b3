use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use market_viz::{PricePoint, geometry::plot_positions, stats::PriceStats};

fn synthetic_series(len: usize) -> Vec<PricePoint> {
    (0..len)
        .map(|i| {
            let price = 450.0 + (i as f64 * 0.07).sin() * 4.0 + i as f64 * 0.001;
            PricePoint::new(1_700_000_000 + i as i64 * 300, price)
        })
        .collect()
}

fn plot_positions_benchmark(c: &mut Criterion) {
    for len in [78, 390, 5_000, 30_000] {
        let series = synthetic_series(len);
        c.bench_function(&format!("plot positions {len}"), |b| {
            b.iter(|| plot_positions(black_box(&series)))
        });
    }
}

fn price_stats_benchmark(c: &mut Criterion) {
    let series = synthetic_series(30_000);
    c.bench_function("price stats 30k", |b| {
        b.iter(|| PriceStats::from_points(black_box(&series)))
    });
}

criterion_group!(benches, plot_positions_benchmark, price_stats_benchmark);
criterion_main!(benches);
