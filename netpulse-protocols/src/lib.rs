//! # netpulse Protocol Decoding
//!
//! Turns captured link-layer frames into `PacketRecord`s.
//!
//! Decoding is deliberately shallow: Ethernet or raw IP, IPv4/IPv6 addresses,
//! and the TCP/UDP/ICMP fields netpulse reports.

pub mod frame;

pub use frame::{FrameDecodeError, FrameDecoder, LinkKind};
