//! Benchmarks for the pattern predicates
//!
//! These run once per symbol per analysis cycle, so the full scan cost is
//! roughly `universe_size * (step + sequence)` on every tick.

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use surgewatch::buffer::PriceSample;
use surgewatch::pattern::{sequence_predicate, step_predicate};

/// A window of samples oscillating around 100 with one two-leg surge at the
/// end, at the density a 5s poll over a 7-minute window produces.
fn surge_window(len: usize) -> Vec<PriceSample> {
    let base = Utc::now();
    let mut samples = Vec::with_capacity(len);
    for i in 0..len {
        let wobble = Decimal::from((i % 7) as i64 - 3) / dec!(10);
        samples.push(PriceSample {
            ts: base + Duration::seconds(i as i64 * 5),
            price: dec!(100) + wobble,
        });
    }
    let n = samples.len();
    if n >= 3 {
        samples[n - 3].price = dec!(100);
        samples[n - 2].price = dec!(102.1);
        samples[n - 1].price = dec!(104.3);
    }
    samples
}

fn benchmark_step_predicate(c: &mut Criterion) {
    let window = surge_window(84);

    c.bench_function("step_predicate_84_samples", |b| {
        b.iter(|| step_predicate(black_box(&window), black_box(dec!(1.0))))
    });
}

fn benchmark_sequence_predicate(c: &mut Criterion) {
    let window = surge_window(84);
    let steps = vec![dec!(2.0), dec!(1.0), dec!(2.0)];

    c.bench_function("sequence_predicate_84_samples", |b| {
        b.iter(|| sequence_predicate(black_box(&window), black_box(&steps), black_box(dec!(1.0))))
    });
}

criterion_group!(benches, benchmark_step_predicate, benchmark_sequence_predicate);
criterion_main!(benches);
