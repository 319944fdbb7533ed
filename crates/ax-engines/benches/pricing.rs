use ax_core::{MarketInputs, OptionType};
use ax_engines::{barone_adesi_whaley, AmericanOptionPricer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_single_boundary(c: &mut Criterion) {
    let inputs =
        MarketInputs::new(100.0, 100.0, 0.5, 0.05, 0.02, 0.20, OptionType::Put).unwrap();
    c.bench_function("barone-adesi-whaley put", |b| {
        b.iter(|| barone_adesi_whaley(black_box(&inputs)).unwrap())
    });
}

fn bench_double_boundary(c: &mut Criterion) {
    let inputs =
        MarketInputs::new(95.0, 100.0, 0.5, -0.01, -0.02, 0.15, OptionType::Put).unwrap();
    let pricer = AmericanOptionPricer::new();
    c.bench_function("double-boundary put (m=50)", |b| {
        b.iter(|| pricer.price(black_box(&inputs)).unwrap())
    });
}

criterion_group!(benches, bench_single_boundary, bench_double_boundary);
criterion_main!(benches);
