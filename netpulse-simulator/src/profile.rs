//! # Traffic profiles
//!
//! The value pools a simulated record is drawn from. `LIVE` drives the
//! continuous simulated capture, `SAMPLE` the one-shot sample batch.

use std::net::{IpAddr, Ipv4Addr};

use netpulse_core::Protocol;

/// Public resolvers mixed into the destination pool.
const RESOLVERS: [Ipv4Addr; 3] = [
    Ipv4Addr::new(8, 8, 8, 8),
    Ipv4Addr::new(1, 1, 1, 1),
    Ipv4Addr::new(9, 9, 9, 9),
];

/// Pools a generator draws from. Every pool must be non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficProfile {
    pub name: &'static str,
    pub protocols: &'static [Protocol],
    pub sizes: &'static [u32],
    /// Sources are `192.168.1.1` up to `192.168.1.<source_hosts>`.
    pub source_hosts: u8,
    /// Private destinations are `10.0.0.1` up to `10.0.0.<dest_hosts>`.
    pub dest_hosts: u8,
    /// How many of the public resolvers join the destination pool.
    pub resolvers: usize,
    pub service_ports: &'static [u16],
}

impl TrafficProfile {
    pub const LIVE: TrafficProfile = TrafficProfile {
        name: "live",
        protocols: &[
            Protocol::Tcp,
            Protocol::Udp,
            Protocol::Icmp,
            Protocol::Http,
            Protocol::Https,
            Protocol::Dns,
            Protocol::Ssh,
            Protocol::Ftp,
        ],
        sizes: &[64, 128, 256, 512, 1024, 1280, 1500],
        source_hosts: 49,
        dest_hosts: 49,
        resolvers: 3,
        service_ports: &[80, 443, 53, 22, 21, 25, 110],
    };

    pub const SAMPLE: TrafficProfile = TrafficProfile {
        name: "sample",
        protocols: &[
            Protocol::Tcp,
            Protocol::Udp,
            Protocol::Icmp,
            Protocol::Http,
            Protocol::Https,
            Protocol::Dns,
            Protocol::Ssh,
        ],
        sizes: &[64, 128, 256, 512, 1024, 1500],
        source_hosts: 19,
        dest_hosts: 19,
        resolvers: 2,
        service_ports: &[80, 443, 53, 22, 21],
    };

    /// Largest size a normal (non-anomalous) record can have.
    pub fn max_normal_size(&self) -> u32 {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    pub fn source_pool(&self) -> Vec<IpAddr> {
        (1..=self.source_hosts)
            .map(|host| IpAddr::V4(Ipv4Addr::new(192, 168, 1, host)))
            .collect()
    }

    pub fn dest_pool(&self) -> Vec<IpAddr> {
        (1..=self.dest_hosts)
            .map(|host| IpAddr::V4(Ipv4Addr::new(10, 0, 0, host)))
            .chain(RESOLVERS.iter().take(self.resolvers).copied().map(IpAddr::V4))
            .collect()
    }
}

/// The port an application protocol is served on, if it has a fixed one.
pub fn well_known_port(protocol: Protocol) -> Option<u16> {
    match protocol {
        Protocol::Http => Some(80),
        Protocol::Https => Some(443),
        Protocol::Dns => Some(53),
        Protocol::Ssh => Some(22),
        Protocol::Ftp => Some(21),
        _ => None,
    }
}
