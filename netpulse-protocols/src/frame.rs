//! ## netpulse-protocols::frame
//! Frame decoder for live capture.
//!
//! Protocol tagging follows a strict priority: TCP, then UDP, then ICMP
//! (v4 or v6), otherwise `Other`. A frame without an IP layer keeps both
//! addresses absent and is tagged `Other`. A frame too short for a header it
//! declares is rejected so that no partially decoded record is ever emitted.

use std::net::IpAddr;

use pnet_packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet_packet::icmp::IcmpPacket;
use pnet_packet::icmpv6::Icmpv6Packet;
use pnet_packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::ipv6::Ipv6Packet;
use pnet_packet::tcp::TcpPacket;
use pnet_packet::udp::UdpPacket;
use pnet_packet::Packet;
use thiserror::Error;

use netpulse_core::{PacketRecord, TcpFlags};

const IPV4_MIN_HEADER: usize = 20;
const SLL_HEADER: usize = 16;

/// Errors that make a frame unusable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FrameDecodeError {
    #[error("Empty frame")]
    Empty,
    #[error("Frame truncated inside the {0} header")]
    Truncated(&'static str),
    #[error("Unsupported IP version {0}")]
    UnsupportedIpVersion(u8),
}

/// Link-layer framing of the captured bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkKind {
    #[default]
    Ethernet,
    /// Linux "cooked" capture (SLL), used by the `any` pseudo-device.
    LinuxCooked,
    /// Frames start directly with an IPv4 or IPv6 header.
    RawIp,
}

impl LinkKind {
    /// Maps a pcap DLT/LINKTYPE code to a supported framing.
    pub fn from_dlt(code: i32) -> Option<Self> {
        match code {
            1 => Some(LinkKind::Ethernet),
            113 => Some(LinkKind::LinuxCooked),
            12 | 14 | 101 | 228 | 229 => Some(LinkKind::RawIp),
            _ => None,
        }
    }
}

/// Decodes frames of one link kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameDecoder {
    link: LinkKind,
}

impl FrameDecoder {
    pub fn new(link: LinkKind) -> Self {
        Self { link }
    }

    pub fn link(&self) -> LinkKind {
        self.link
    }

    /// Decodes `frame` captured at `timestamp` (Unix seconds).
    ///
    /// `wire_len` is the length of the packet on the wire, which may exceed
    /// `frame.len()` when the capture snap length truncated it.
    pub fn decode(
        &self,
        frame: &[u8],
        wire_len: u32,
        timestamp: f64,
    ) -> Result<PacketRecord, FrameDecodeError> {
        if frame.is_empty() {
            return Err(FrameDecodeError::Empty);
        }
        match self.link {
            LinkKind::Ethernet => decode_ethernet(frame, wire_len, timestamp),
            LinkKind::LinuxCooked => decode_linux_cooked(frame, wire_len, timestamp),
            LinkKind::RawIp => decode_ip(frame, wire_len, timestamp),
        }
    }
}

fn decode_ethernet(
    frame: &[u8],
    wire_len: u32,
    timestamp: f64,
) -> Result<PacketRecord, FrameDecodeError> {
    let ethernet = EthernetPacket::new(frame).ok_or(FrameDecodeError::Truncated("Ethernet"))?;
    match ethernet.get_ethertype() {
        EtherTypes::Ipv4 => decode_ipv4(ethernet.payload(), wire_len, timestamp),
        EtherTypes::Ipv6 => decode_ipv6(ethernet.payload(), wire_len, timestamp),
        _ => Ok(PacketRecord::new(timestamp, wire_len, None, None).other()),
    }
}

fn decode_linux_cooked(
    frame: &[u8],
    wire_len: u32,
    timestamp: f64,
) -> Result<PacketRecord, FrameDecodeError> {
    if frame.len() < SLL_HEADER {
        return Err(FrameDecodeError::Truncated("SLL"));
    }
    let payload = &frame[SLL_HEADER..];
    match EtherType(u16::from_be_bytes([frame[14], frame[15]])) {
        EtherTypes::Ipv4 => decode_ipv4(payload, wire_len, timestamp),
        EtherTypes::Ipv6 => decode_ipv6(payload, wire_len, timestamp),
        _ => Ok(PacketRecord::new(timestamp, wire_len, None, None).other()),
    }
}

fn decode_ip(data: &[u8], wire_len: u32, timestamp: f64) -> Result<PacketRecord, FrameDecodeError> {
    match data[0] >> 4 {
        4 => decode_ipv4(data, wire_len, timestamp),
        6 => decode_ipv6(data, wire_len, timestamp),
        version => Err(FrameDecodeError::UnsupportedIpVersion(version)),
    }
}

fn decode_ipv4(
    data: &[u8],
    wire_len: u32,
    timestamp: f64,
) -> Result<PacketRecord, FrameDecodeError> {
    let ipv4 = Ipv4Packet::new(data).ok_or(FrameDecodeError::Truncated("IPv4"))?;
    let header_len = usize::from(ipv4.get_header_length()) * 4;
    if header_len < IPV4_MIN_HEADER || header_len > data.len() {
        return Err(FrameDecodeError::Truncated("IPv4"));
    }

    let record = PacketRecord::new(
        timestamp,
        wire_len,
        Some(IpAddr::V4(ipv4.get_source())),
        Some(IpAddr::V4(ipv4.get_destination())),
    );
    // Later fragments carry payload bytes, not a transport header.
    if ipv4.get_fragment_offset() != 0 {
        return Ok(record.other());
    }
    decode_transport(record, ipv4.get_next_level_protocol(), ipv4.payload())
}

fn decode_ipv6(
    data: &[u8],
    wire_len: u32,
    timestamp: f64,
) -> Result<PacketRecord, FrameDecodeError> {
    let ipv6 = Ipv6Packet::new(data).ok_or(FrameDecodeError::Truncated("IPv6"))?;
    let record = PacketRecord::new(
        timestamp,
        wire_len,
        Some(IpAddr::V6(ipv6.get_source())),
        Some(IpAddr::V6(ipv6.get_destination())),
    );
    decode_transport(record, ipv6.get_next_header(), ipv6.payload())
}

fn decode_transport(
    record: PacketRecord,
    protocol: IpNextHeaderProtocol,
    payload: &[u8],
) -> Result<PacketRecord, FrameDecodeError> {
    match protocol {
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(payload).ok_or(FrameDecodeError::Truncated("TCP"))?;
            // Only the low control bits are tracked.
            let raw = u16::from(tcp.get_flags()) & 0xff;
            Ok(record.tcp(
                tcp.get_source(),
                tcp.get_destination(),
                Some(TcpFlags::from_bits_truncate(raw as u8)),
            ))
        }
        IpNextHeaderProtocols::Udp => {
            let udp = UdpPacket::new(payload).ok_or(FrameDecodeError::Truncated("UDP"))?;
            Ok(record.udp(udp.get_source(), udp.get_destination()))
        }
        IpNextHeaderProtocols::Icmp => {
            let icmp = IcmpPacket::new(payload).ok_or(FrameDecodeError::Truncated("ICMP"))?;
            Ok(record.icmp(Some(icmp.get_icmp_type().0)))
        }
        IpNextHeaderProtocols::Icmpv6 => {
            let icmp = Icmpv6Packet::new(payload).ok_or(FrameDecodeError::Truncated("ICMPv6"))?;
            Ok(record.icmp(Some(icmp.get_icmpv6_type().0)))
        }
        _ => Ok(record.other()),
    }
}
