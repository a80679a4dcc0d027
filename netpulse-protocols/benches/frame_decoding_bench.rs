#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};

use netpulse_protocols::{FrameDecoder, LinkKind};

// Ethernet II / IPv4 / TCP SYN-ACK, 192.168.1.10:51000 -> 10.0.0.5:443
const TCP_FRAME: &[u8] = &[
    0xaa, 0xaa, 0xaa, 0xaa, 0xaa, 0xaa, // Destination MAC
    0xbb, 0xbb, 0xbb, 0xbb, 0xbb, 0xbb, // Source MAC
    0x08, 0x00, // EtherType IPv4
    0x45, 0x00, 0x00, 0x28, // Version/IHL, DSCP, total length 40
    0x00, 0x00, 0x40, 0x00, // Identification, flags
    0x40, 0x06, 0x00, 0x00, // TTL, protocol TCP, checksum
    0xc0, 0xa8, 0x01, 0x0a, // Source 192.168.1.10
    0x0a, 0x00, 0x00, 0x05, // Destination 10.0.0.5
    0xc7, 0x38, 0x01, 0xbb, // Ports 51000 -> 443
    0x00, 0x00, 0x00, 0x00, // Sequence
    0x00, 0x00, 0x00, 0x00, // Acknowledgement
    0x50, 0x12, 0xff, 0xff, // Data offset, SYN+ACK, window
    0x00, 0x00, 0x00, 0x00, // Checksum, urgent pointer
];

// Raw IPv4 / UDP, 192.168.1.10:5353 -> 10.0.0.5:53
const UDP_PACKET: &[u8] = &[
    0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8, 0x01,
    0x0a, 0x0a, 0x00, 0x00, 0x05, 0x14, 0xe9, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00,
];

fn benchmark_ethernet_tcp_decoding(c: &mut Criterion) {
    let decoder = FrameDecoder::new(LinkKind::Ethernet);

    c.bench_function("ethernet_tcp_decoding", |b| {
        b.iter(|| {
            black_box(decoder.decode(black_box(TCP_FRAME), 54, 0.0)).unwrap();
        })
    });
}

fn benchmark_raw_ip_udp_decoding(c: &mut Criterion) {
    let decoder = FrameDecoder::new(LinkKind::RawIp);

    c.bench_function("raw_ip_udp_decoding", |b| {
        b.iter(|| {
            black_box(decoder.decode(black_box(UDP_PACKET), 28, 0.0)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_ethernet_tcp_decoding,
    benchmark_raw_ip_udp_decoding
);
criterion_main!(benches);
