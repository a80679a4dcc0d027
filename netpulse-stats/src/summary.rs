//! ## netpulse-stats::summary
//! **Aggregate statistics over a store snapshot**
//!
//! ### Expectations:
//! - `compute` is pure: the same snapshot always yields the same summary
//! - Rankings are by descending count, ties in first-seen order
//! - An empty snapshot has no details at all, not zero-filled ones

use std::fmt;

use serde::Serialize;

use netpulse_core::{PacketRecord, Protocol};

use crate::frequency::FrequencyTable;

/// How many source addresses and destination ports are ranked.
pub const TOP_N: usize = 5;

/// Where the records of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaptureType {
    Real,
    Sample,
}

impl CaptureType {
    pub fn from_real(is_real_capture: bool) -> Self {
        if is_real_capture {
            CaptureType::Real
        } else {
            CaptureType::Sample
        }
    }

    /// Label used in report titles.
    pub fn title(self) -> &'static str {
        match self {
            CaptureType::Real => "Real Packet Capture",
            CaptureType::Sample => "Sample Data",
        }
    }
}

impl fmt::Display for CaptureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaptureType::Real => "Real packets",
            CaptureType::Sample => "Sample data",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolShare {
    pub protocol: Protocol,
    pub count: usize,
    /// Share of all packets, 0 to 100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressCount {
    /// Address text, or `N/A` for records without one.
    pub address: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortCount {
    pub port: u16,
    pub count: usize,
}

/// Everything beyond the packet count; only present for non-empty snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficDetails {
    pub total_bytes: u64,
    pub duration_secs: f64,
    pub packets_per_second: f64,
    pub protocol_distribution: Vec<ProtocolShare>,
    pub top_source_addrs: Vec<AddressCount>,
    pub top_dest_ports: Vec<PortCount>,
    pub capture_type: CaptureType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    pub total_packets: usize,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub details: Option<TrafficDetails>,
}

/// One line of the statistics dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    Text(String),
    Nested(Vec<(String, String)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub label: &'static str,
    pub value: StatValue,
}

impl StatEntry {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: StatValue::Text(value.into()),
        }
    }

    fn nested(label: &'static str, items: Vec<(String, String)>) -> Self {
        Self {
            label,
            value: StatValue::Nested(items),
        }
    }
}

impl TrafficSummary {
    pub fn empty() -> Self {
        Self {
            total_packets: 0,
            details: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_packets == 0
    }

    /// The labelled statistics dump, in display order.
    pub fn entries(&self) -> Vec<StatEntry> {
        let mut entries = vec![StatEntry::text("Total packets", self.total_packets.to_string())];
        let Some(details) = &self.details else {
            return entries;
        };

        let pps = if details.duration_secs > 0.0 {
            format!("{:.1}", details.packets_per_second)
        } else {
            "0".to_string()
        };
        entries.push(StatEntry::text(
            "Total data",
            format!("{:.2} KB", details.total_bytes as f64 / 1024.0),
        ));
        entries.push(StatEntry::text(
            "Capture duration",
            format!("{:.1} seconds", details.duration_secs),
        ));
        entries.push(StatEntry::text("Packets/second", pps));
        entries.push(StatEntry::nested(
            "Protocol distribution",
            details
                .protocol_distribution
                .iter()
                .map(|share| {
                    (
                        share.protocol.to_string(),
                        format!("{} ({:.1}%)", share.count, share.percentage),
                    )
                })
                .collect(),
        ));
        entries.push(StatEntry::nested(
            "Top source IPs",
            details
                .top_source_addrs
                .iter()
                .map(|a| (a.address.clone(), a.count.to_string()))
                .collect(),
        ));
        entries.push(StatEntry::nested(
            "Top destination ports",
            details
                .top_dest_ports
                .iter()
                .map(|p| (p.port.to_string(), p.count.to_string()))
                .collect(),
        ));
        entries.push(StatEntry::text("Capture type", details.capture_type.to_string()));
        entries
    }
}

/// Computes the summary of `records`.
pub fn compute(records: &[PacketRecord], capture_type: CaptureType) -> TrafficSummary {
    if records.is_empty() {
        return TrafficSummary::empty();
    }

    let total_packets = records.len();
    let mut total_bytes = 0u64;
    let mut first = f64::INFINITY;
    let mut last = f64::NEG_INFINITY;
    let mut protocols = FrequencyTable::new();
    let mut sources = FrequencyTable::new();
    let mut ports = FrequencyTable::new();

    for record in records {
        total_bytes += u64::from(record.size());
        first = first.min(record.timestamp());
        last = last.max(record.timestamp());
        protocols.add(record.protocol());
        sources.add(record.source_label());
        if let Some(port) = record.dest_port() {
            ports.add(port);
        }
    }

    let duration_secs = (last - first).max(0.0);
    let packets_per_second = if duration_secs > 0.0 {
        total_packets as f64 / duration_secs
    } else {
        0.0
    };

    let protocol_distribution = protocols
        .ranked()
        .into_iter()
        .map(|(protocol, count)| ProtocolShare {
            protocol,
            count,
            percentage: count as f64 / total_packets as f64 * 100.0,
        })
        .collect();
    let top_source_addrs = sources
        .top(TOP_N)
        .into_iter()
        .map(|(address, count)| AddressCount { address, count })
        .collect();
    let top_dest_ports = ports
        .top(TOP_N)
        .into_iter()
        .map(|(port, count)| PortCount { port, count })
        .collect();

    TrafficSummary {
        total_packets,
        details: Some(TrafficDetails {
            total_bytes,
            duration_secs,
            packets_per_second,
            protocol_distribution,
            top_source_addrs,
            top_dest_ports,
            capture_type,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_core::TcpFlags;
    use proptest::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(last: u8) -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, last)))
    }

    fn fixture() -> Vec<PacketRecord> {
        vec![
            PacketRecord::new(100.0, 100, ip(1), ip(9)).tcp(5000, 443, Some(TcpFlags::SYN)),
            PacketRecord::new(101.0, 200, ip(2), ip(9)).udp(5001, 53),
            PacketRecord::new(102.0, 300, ip(1), ip(9)).tcp(5002, 443, None),
            PacketRecord::new(104.0, 424, None, None).other(),
        ]
    }

    #[test]
    fn empty_snapshot_serializes_to_count_only() {
        let summary = compute(&[], CaptureType::Real);
        assert_eq!(summary, TrafficSummary::empty());
        assert_eq!(serde_yaml::to_string(&summary).unwrap(), "total_packets: 0\n");
        assert_eq!(
            summary.entries(),
            vec![StatEntry::text("Total packets", "0")]
        );
    }

    #[test]
    fn fixture_summary() {
        let summary = compute(&fixture(), CaptureType::Sample);
        let details = summary.details.clone().unwrap();

        assert_eq!(summary.total_packets, 4);
        assert_eq!(details.total_bytes, 1024);
        assert_eq!(details.duration_secs, 4.0);
        assert_eq!(details.packets_per_second, 1.0);
        assert_eq!(
            details
                .protocol_distribution
                .iter()
                .map(|s| (s.protocol, s.count))
                .collect::<Vec<_>>(),
            vec![(Protocol::Tcp, 2), (Protocol::Udp, 1), (Protocol::Other, 1)]
        );
        assert_eq!(details.top_source_addrs[0].address, "192.168.1.1");
        assert_eq!(details.top_source_addrs[2].address, "N/A");
        assert_eq!(
            details.top_dest_ports,
            vec![PortCount { port: 443, count: 2 }, PortCount { port: 53, count: 1 }]
        );
    }

    #[test]
    fn fixture_entries() {
        let entries = compute(&fixture(), CaptureType::Sample).entries();
        let labels: Vec<_> = entries.iter().map(|e| e.label).collect();
        assert_eq!(
            labels,
            vec![
                "Total packets",
                "Total data",
                "Capture duration",
                "Packets/second",
                "Protocol distribution",
                "Top source IPs",
                "Top destination ports",
                "Capture type",
            ]
        );
        assert_eq!(entries[1].value, StatValue::Text("1.00 KB".into()));
        assert_eq!(entries[2].value, StatValue::Text("4.0 seconds".into()));
        assert_eq!(entries[3].value, StatValue::Text("1.0".into()));
        assert_eq!(
            entries[4].value,
            StatValue::Nested(vec![
                ("TCP".into(), "2 (50.0%)".into()),
                ("UDP".into(), "1 (25.0%)".into()),
                ("Other".into(), "1 (25.0%)".into()),
            ])
        );
        assert_eq!(entries[7].value, StatValue::Text("Sample data".into()));
    }

    #[test]
    fn single_timestamp_has_zero_rate() {
        let records = vec![
            PacketRecord::new(5.0, 60, ip(1), ip(2)).icmp(Some(8)),
            PacketRecord::new(5.0, 60, ip(1), ip(2)).icmp(Some(0)),
        ];
        let summary = compute(&records, CaptureType::Real);
        let details = summary.details.as_ref().unwrap();
        assert_eq!(details.duration_secs, 0.0);
        assert_eq!(details.packets_per_second, 0.0);
        assert!(details.top_dest_ports.is_empty());
        assert_eq!(summary.entries()[3].value, StatValue::Text("0".into()));
    }

    fn arb_record() -> impl Strategy<Value = PacketRecord> {
        (0.0..1e6f64, 0u32..10_000, 0u8..4, any::<u16>(), 0u8..8).prop_map(
            |(ts, size, host, port, kind)| {
                let record = PacketRecord::new(ts, size, ip(host), ip(200));
                match kind {
                    0 => record.tcp(port, port, Some(TcpFlags::ACK)),
                    1 => record.udp(port, port),
                    2 => record.icmp(None),
                    3 => record.service(Protocol::Dns, port, 53),
                    4 => record.service(Protocol::Https, port, 443),
                    5 => record.other(),
                    6 => PacketRecord::new(ts, size, None, None).other(),
                    _ => record,
                }
            },
        )
    }

    proptest! {
        #[test]
        fn totals_agree(records in proptest::collection::vec(arb_record(), 0..200)) {
            let summary = compute(&records, CaptureType::Sample);
            prop_assert_eq!(summary.total_packets, records.len());

            if let Some(details) = summary.details {
                let counted: usize = details.protocol_distribution.iter().map(|s| s.count).sum();
                prop_assert_eq!(counted, records.len());

                let percent: f64 = details.protocol_distribution.iter().map(|s| s.percentage).sum();
                prop_assert!((percent - 100.0).abs() < 1e-6);

                prop_assert!(details.top_source_addrs.len() <= TOP_N);
                prop_assert!(details
                    .protocol_distribution
                    .windows(2)
                    .all(|w| w[0].count >= w[1].count));
            } else {
                prop_assert!(records.is_empty());
            }
        }

        #[test]
        fn compute_is_deterministic(records in proptest::collection::vec(arb_record(), 0..100)) {
            prop_assert_eq!(
                compute(&records, CaptureType::Real),
                compute(&records, CaptureType::Real)
            );
        }
    }
}
