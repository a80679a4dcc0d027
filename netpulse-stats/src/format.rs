//! Human-readable packet text for lists, detail views and reports.

use std::fmt::{Display, Write};

use chrono::{DateTime, TimeZone};

use netpulse_core::{PacketRecord, Protocol, ADDR_SENTINEL};

use crate::summary::CaptureType;

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| ADDR_SENTINEL.to_string(), |v| v.to_string())
}

/// Converts a record timestamp into `tz`, at microsecond precision.
pub fn record_time<Tz: TimeZone>(timestamp: f64, tz: &Tz) -> Option<DateTime<Tz>> {
    if !timestamp.is_finite() {
        return None;
    }
    let micros = (timestamp * 1e6).round() as i64;
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(tz))
}

/// One-line summary of a record.
///
/// ```
/// use netpulse_core::{PacketRecord, TcpFlags};
/// use netpulse_stats::format_packet_info;
///
/// let record = PacketRecord::new(0.0, 60, None, None)
///     .tcp(51000, 443, Some(TcpFlags::SYN | TcpFlags::ACK));
/// assert_eq!(format_packet_info(&record), "TCP 51000 → 443 [SYN ACK]");
/// ```
pub fn format_packet_info(record: &PacketRecord) -> String {
    let ports = || {
        format!(
            "{} → {}",
            or_na(record.source_port()),
            or_na(record.dest_port())
        )
    };
    match record.protocol() {
        Protocol::Tcp => match record.tcp_flags().filter(|flags| !flags.is_empty()) {
            Some(flags) => format!("TCP {} [{flags}]", ports()),
            None => format!("TCP {}", ports()),
        },
        Protocol::Udp => format!("UDP {}", ports()),
        Protocol::Icmp => format!("ICMP {}", or_na(record.icmp_type())),
        Protocol::Http => "HTTP GET /".to_string(),
        Protocol::Https => "TLS Client Hello".to_string(),
        Protocol::Dns => "DNS Standard query".to_string(),
        other => format!("{other} packet"),
    }
}

/// Multi-line detail view of a record, times rendered in `tz`.
pub fn format_packet_details<Tz>(record: &PacketRecord, capture_type: CaptureType, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::from("Packet Details:\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    let time = record_time(record.timestamp(), tz)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| ADDR_SENTINEL.to_string());
    let _ = writeln!(out, "Time: {time}");
    let _ = writeln!(
        out,
        "Source: {}:{}",
        record.source_label(),
        or_na(record.source_port())
    );
    let _ = writeln!(
        out,
        "Destination: {}:{}",
        record.dest_label(),
        or_na(record.dest_port())
    );
    let _ = writeln!(out, "Protocol: {}", record.protocol());
    let _ = writeln!(out, "Length: {} bytes", record.size());

    if matches!(record.protocol(), Protocol::Tcp | Protocol::Udp) {
        let _ = writeln!(out, "Source Port: {}", or_na(record.source_port()));
        let _ = writeln!(out, "Destination Port: {}", or_na(record.dest_port()));
    }
    if let Some(flags) = record.tcp_flags() {
        let _ = writeln!(out, "TCP Flags: {}", flags.names().join(", "));
    }
    if let Some(kind) = record.icmp_type() {
        let _ = writeln!(out, "ICMP Type: {kind}");
    }

    let _ = writeln!(out, "Capture Type: {capture_type}");
    out
}
