//! ## netpulse-engine::report
//! **Plain-text session reports**
//!
//! ### Layout:
//! - Header: capture type, generation time, packet count
//! - The statistics dump, nested entries indented by two spaces
//! - A tab-separated packet list, 1-indexed, in store order
//!
//! Rendering is pure; only [`write_report`] touches the filesystem.

use std::fmt::{Display, Write};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use thiserror::Error;
use tracing::info;

use netpulse_core::PacketRecord;
use netpulse_stats::{format_packet_info, record_time, CaptureType, StatValue, TrafficSummary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No packets to export")]
    NoData,

    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// `packet_report_<YYYYMMDD_HHMMSS>.txt` for the generation time.
pub fn report_file_name<Tz>(generated: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("packet_report_{}.txt", generated.format("%Y%m%d_%H%M%S"))
}

/// Renders the report text. Packet times use `generated`'s time zone.
pub fn render_report<Tz>(
    records: &[PacketRecord],
    summary: &TrafficSummary,
    capture_type: CaptureType,
    generated: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "Packet Capture Report - {}", capture_type.title());
    out.push_str("====================\n\n");
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Total packets: {}\n", records.len());

    for entry in summary.entries() {
        match entry.value {
            StatValue::Text(value) => {
                let _ = writeln!(out, "{}: {value}", entry.label);
            }
            StatValue::Nested(items) => {
                let _ = writeln!(out, "{}:", entry.label);
                for (key, value) in items {
                    let _ = writeln!(out, "  {key}: {value}");
                }
            }
        }
    }

    out.push_str("\n\nPacket List:\n");
    out.push_str("No.\tTime\tSource\tDestination\tProtocol\tLength\tInfo\n");
    let tz = generated.timezone();
    for (index, record) in records.iter().enumerate() {
        let time = record_time(record.timestamp(), &tz)
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}\t{time}\t{}\t{}\t{}\t{}\t{}",
            index + 1,
            record.source_label(),
            record.dest_label(),
            record.protocol(),
            record.size(),
            format_packet_info(record),
        );
    }
    out
}

/// Renders the report and writes it into `dir`. Returns the file path.
pub fn write_report<Tz>(
    dir: &Path,
    records: &[PacketRecord],
    summary: &TrafficSummary,
    capture_type: CaptureType,
    generated: &DateTime<Tz>,
) -> Result<PathBuf, ReportError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if records.is_empty() {
        return Err(ReportError::NoData);
    }
    let path = dir.join(report_file_name(generated));
    std::fs::write(&path, render_report(records, summary, capture_type, generated))?;
    info!(path = %path.display(), records = records.len(), "Report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use netpulse_core::TcpFlags;
    use netpulse_stats::compute;
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Option<IpAddr> {
        Some(IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
    }

    #[test]
    fn file_name_uses_generation_time() {
        let generated = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(report_file_name(&generated), "packet_report_20240305_070809.txt");
    }

    #[test]
    fn single_record_layout() {
        let generated = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let records = vec![PacketRecord::new(1_709_622_000.5, 2048, ip(192, 168, 1, 2), ip(8, 8, 8, 8))
            .tcp(40000, 443, Some(TcpFlags::SYN))];
        let summary = compute(&records, CaptureType::Real);
        let text = render_report(&records, &summary, CaptureType::Real, &generated);

        assert!(text.starts_with("Packet Capture Report - Real Packet Capture\n"));
        assert!(text.contains("Capture type: Real packets\n\n\nPacket List:\n"));
        assert!(text.ends_with("1\t07:00:00.500\t192.168.1.2\t8.8.8.8\tTCP\t2048\tTCP 40000 → 443 [SYN]\n"));
    }

    #[test]
    fn mixed_session_report_is_exact() {
        let generated = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let records = vec![
            PacketRecord::new(1_709_622_000.0, 60, ip(192, 168, 1, 2), ip(10, 0, 0, 5))
                .tcp(51000, 443, Some(TcpFlags::SYN | TcpFlags::ACK)),
            PacketRecord::new(1_709_622_001.25, 80, ip(192, 168, 1, 3), ip(8, 8, 8, 8))
                .udp(5353, 53),
            PacketRecord::new(1_709_622_002.5, 100, ip(192, 168, 1, 2), ip(10, 0, 0, 5))
                .icmp(Some(8)),
        ];
        let summary = compute(&records, CaptureType::Sample);

        let expected = "\
Packet Capture Report - Sample Data
====================

Generated: 2024-03-05 07:08:09
Total packets: 3

Total packets: 3
Total data: 0.23 KB
Capture duration: 2.5 seconds
Packets/second: 1.2
Protocol distribution:
  TCP: 1 (33.3%)
  UDP: 1 (33.3%)
  ICMP: 1 (33.3%)
Top source IPs:
  192.168.1.2: 2
  192.168.1.3: 1
Top destination ports:
  443: 1
  53: 1
Capture type: Sample data


Packet List:
No.\tTime\tSource\tDestination\tProtocol\tLength\tInfo
1\t07:00:00.000\t192.168.1.2\t10.0.0.5\tTCP\t60\tTCP 51000 → 443 [SYN ACK]
2\t07:00:01.250\t192.168.1.3\t8.8.8.8\tUDP\t80\tUDP 5353 → 53
3\t07:00:02.500\t192.168.1.2\t10.0.0.5\tICMP\t100\tICMP 8
";
        assert_eq!(
            render_report(&records, &summary, CaptureType::Sample, &generated),
            expected
        );
    }

    #[test]
    fn empty_session_is_refused() {
        let generated = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let result = write_report(
            Path::new("."),
            &[],
            &TrafficSummary::empty(),
            CaptureType::Sample,
            &generated,
        );
        assert!(matches!(result, Err(ReportError::NoData)));
    }
}
