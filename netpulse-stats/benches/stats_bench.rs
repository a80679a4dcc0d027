#[macro_use]
extern crate criterion;

use std::net::{IpAddr, Ipv4Addr};

use criterion::{black_box, BenchmarkId, Criterion};

use netpulse_core::{PacketRecord, Protocol, TcpFlags};
use netpulse_stats::{compute, timeline, CaptureType};

fn snapshot(len: usize) -> Vec<PacketRecord> {
    (0..len)
        .map(|i| {
            let src = Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, (i % 49) as u8 + 1)));
            let dst = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, (i % 13) as u8 + 1)));
            let record = PacketRecord::new(i as f64 * 0.1, 64 + (i % 1400) as u32, src, dst);
            match i % 4 {
                0 => record.tcp(40000, 443, Some(TcpFlags::ACK)),
                1 => record.udp(40000, 53),
                2 => record.icmp(Some(8)),
                _ => record.service(Protocol::Ssh, 40000, 22),
            }
        })
        .collect()
}

/// Full recompute cost at the sizes a long session reaches.
fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary_compute");
    for len in [1_000, 10_000, 100_000] {
        let records = snapshot(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &records, |b, records| {
            b.iter(|| black_box(compute(black_box(records), CaptureType::Real)))
        });
    }
    group.finish();
}

fn benchmark_timeline(c: &mut Criterion) {
    let records = snapshot(100_000);
    c.bench_function("timeline_100k", |b| {
        b.iter(|| black_box(timeline(black_box(&records), 10)))
    });
}

criterion_group!(benches, benchmark_compute, benchmark_timeline);
criterion_main!(benches);
