//! # netpulse-stats
//!
//! Pure functions over a store snapshot: the traffic summary and its labelled
//! dump, the traffic timeline, and packet text for lists and detail views.
//!
//! ### Key Submodules:
//! - `summary`: `compute` and `TrafficSummary`
//! - `timeline`: fixed-width time buckets
//! - `format`: `format_packet_info` and `format_packet_details`
//! - `frequency`: first-seen-stable frequency ranking

pub mod format;
pub mod frequency;
pub mod summary;
pub mod timeline;

pub use format::{format_packet_details, format_packet_info, record_time};
pub use frequency::FrequencyTable;
pub use summary::{
    compute, AddressCount, CaptureType, PortCount, ProtocolShare, StatEntry, StatValue,
    TrafficDetails, TrafficSummary, TOP_N,
};
pub use timeline::{timeline, TimeBucket};
