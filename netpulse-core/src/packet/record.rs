use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::TcpFlags;

/// Rendering used for an address the frame did not carry.
pub const ADDR_SENTINEL: &str = "N/A";

/// Protocol tag assigned to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
    #[serde(rename = "ICMP")]
    Icmp,
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "HTTPS")]
    Https,
    #[serde(rename = "DNS")]
    Dns,
    #[serde(rename = "SSH")]
    Ssh,
    #[serde(rename = "FTP")]
    Ftp,
    Other,
    Unknown,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Dns => "DNS",
            Protocol::Ssh => "SSH",
            Protocol::Ftp => "FTP",
            Protocol::Other => "Other",
            Protocol::Unknown => "Unknown",
        }
    }

    /// Whether records of this protocol have source/destination ports.
    pub const fn carries_ports(self) -> bool {
        matches!(
            self,
            Protocol::Tcp
                | Protocol::Udp
                | Protocol::Http
                | Protocol::Https
                | Protocol::Dns
                | Protocol::Ssh
                | Protocol::Ftp
        )
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of one observed (or simulated) packet.
///
/// Records are plain `Copy` values. The protocol-specific fields are set by
/// the protocol constructors ([`PacketRecord::tcp`], [`PacketRecord::udp`],
/// ...), each of which clears every field that does not apply, so a UDP record
/// can never carry TCP flags.
///
/// ```
/// use netpulse_core::{PacketRecord, Protocol, TcpFlags};
///
/// let record = PacketRecord::new(1.5, 60, None, None).tcp(40000, 443, Some(TcpFlags::SYN));
/// assert_eq!(record.protocol(), Protocol::Tcp);
/// assert_eq!(record.icmp_type(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacketRecord {
    timestamp: f64,
    size: u32,
    source_addr: Option<IpAddr>,
    dest_addr: Option<IpAddr>,
    protocol: Protocol,
    source_port: Option<u16>,
    dest_port: Option<u16>,
    tcp_flags: Option<TcpFlags>,
    icmp_type: Option<u8>,
}

impl PacketRecord {
    /// Starts a record with protocol `Unknown` and no protocol-specific fields.
    pub fn new(
        timestamp: f64,
        size: u32,
        source_addr: Option<IpAddr>,
        dest_addr: Option<IpAddr>,
    ) -> Self {
        Self {
            timestamp,
            size,
            source_addr,
            dest_addr,
            protocol: Protocol::Unknown,
            source_port: None,
            dest_port: None,
            tcp_flags: None,
            icmp_type: None,
        }
    }

    fn tagged(self, protocol: Protocol) -> Self {
        Self::new(self.timestamp, self.size, self.source_addr, self.dest_addr).with_protocol(protocol)
    }

    fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn tcp(self, source_port: u16, dest_port: u16, flags: Option<TcpFlags>) -> Self {
        Self {
            source_port: Some(source_port),
            dest_port: Some(dest_port),
            tcp_flags: flags,
            ..self.tagged(Protocol::Tcp)
        }
    }

    pub fn udp(self, source_port: u16, dest_port: u16) -> Self {
        Self {
            source_port: Some(source_port),
            dest_port: Some(dest_port),
            ..self.tagged(Protocol::Udp)
        }
    }

    pub fn icmp(self, icmp_type: Option<u8>) -> Self {
        Self {
            icmp_type,
            ..self.tagged(Protocol::Icmp)
        }
    }

    /// Tags the record with `protocol`; ports are kept only when the protocol
    /// carries them.
    ///
    /// TCP flags and ICMP types are never set here, use [`PacketRecord::tcp`]
    /// or [`PacketRecord::icmp`] for those.
    pub fn service(self, protocol: Protocol, source_port: u16, dest_port: u16) -> Self {
        let record = self.tagged(protocol);
        if protocol.carries_ports() {
            Self {
                source_port: Some(source_port),
                dest_port: Some(dest_port),
                ..record
            }
        } else {
            record
        }
    }

    pub fn other(self) -> Self {
        self.tagged(Protocol::Other)
    }

    /// Same record with a different byte length.
    pub fn with_size(self, size: u32) -> Self {
        Self { size, ..self }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn source_addr(&self) -> Option<IpAddr> {
        self.source_addr
    }

    pub fn dest_addr(&self) -> Option<IpAddr> {
        self.dest_addr
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn source_port(&self) -> Option<u16> {
        self.source_port
    }

    pub fn dest_port(&self) -> Option<u16> {
        self.dest_port
    }

    pub fn tcp_flags(&self) -> Option<TcpFlags> {
        self.tcp_flags
    }

    pub fn icmp_type(&self) -> Option<u8> {
        self.icmp_type
    }

    /// Source address as text, `N/A` when absent.
    pub fn source_label(&self) -> String {
        addr_label(self.source_addr)
    }

    /// Destination address as text, `N/A` when absent.
    pub fn dest_label(&self) -> String {
        addr_label(self.dest_addr)
    }
}

fn addr_label(addr: Option<IpAddr>) -> String {
    addr.map_or_else(|| ADDR_SENTINEL.to_string(), |a| a.to_string())
}
