//! Synthetic packet record generation.

use std::net::IpAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use netpulse_core::{PacketRecord, Protocol, TcpFlags};

use crate::profile::{well_known_port, TrafficProfile};

/// Flag combinations a simulated TCP record can carry.
pub const TCP_FLAG_CHOICES: [TcpFlags; 4] = [
    TcpFlags::SYN,
    TcpFlags::ACK,
    TcpFlags::SYN.union(TcpFlags::ACK),
    TcpFlags::PSH.union(TcpFlags::ACK),
];

/// Echo reply and echo request.
pub const ICMP_TYPE_CHOICES: [u8; 2] = [0, 8];

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

/// Draws records from a [`TrafficProfile`].
#[derive(Debug)]
pub struct TrafficGenerator {
    profile: TrafficProfile,
    sources: Vec<IpAddr>,
    destinations: Vec<IpAddr>,
    rng: StdRng,
}

impl TrafficGenerator {
    /// With a `seed` every draw is reproducible; otherwise the RNG is seeded
    /// from the OS.
    pub fn new(profile: TrafficProfile, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            profile,
            sources: profile.source_pool(),
            destinations: profile.dest_pool(),
            rng,
        }
    }

    pub fn profile(&self) -> &TrafficProfile {
        &self.profile
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Draws one normal-sized record stamped with `timestamp`.
    pub fn next_record(&mut self, timestamp: f64) -> PacketRecord {
        let rng = &mut self.rng;
        let protocol = pick(rng, self.profile.protocols);
        let size = pick(rng, self.profile.sizes);
        let source = pick(rng, &self.sources);
        let destination = pick(rng, &self.destinations);
        let source_port = rng.random_range(1024..=65535);
        let service_port = pick(rng, self.profile.service_ports);

        let record = PacketRecord::new(timestamp, size, Some(source), Some(destination));
        match protocol {
            Protocol::Tcp => {
                let flags = pick(rng, &TCP_FLAG_CHOICES);
                record.tcp(source_port, service_port, Some(flags))
            }
            Protocol::Udp => record.udp(source_port, service_port),
            Protocol::Icmp => record.icmp(Some(pick(rng, &ICMP_TYPE_CHOICES))),
            other => {
                let dest_port = well_known_port(other).unwrap_or(service_port);
                record.service(other, source_port, dest_port)
            }
        }
    }
}
