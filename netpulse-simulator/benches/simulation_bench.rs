#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use netpulse_simulator::{
    generate_sample_batch, SampleOptions, TrafficGenerator, TrafficProfile, VirtualClock,
};

/// Raw draw throughput of the live profile.
fn benchmark_record_generation(c: &mut Criterion) {
    let mut generator = TrafficGenerator::new(TrafficProfile::LIVE, Some(42));
    let mut ts = 0.0;

    c.bench_function("record_generation", |b| {
        b.iter(|| {
            ts += 0.1;
            black_box(generator.next_record(black_box(ts)));
        })
    });
}

fn benchmark_sample_batch(c: &mut Criterion) {
    let clock = VirtualClock::from_secs(1_700_000_000);
    let options = SampleOptions {
        seed: Some(42),
        ..SampleOptions::default()
    };

    c.bench_function("sample_batch_200", |b| {
        b.iter(|| black_box(generate_sample_batch(&options, &clock)))
    });
}

criterion_group!(benches, benchmark_record_generation, benchmark_sample_batch);
criterion_main!(benches);
