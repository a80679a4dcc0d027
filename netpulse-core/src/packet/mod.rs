//! ## netpulse-core::packet
//! **Typed packet metadata**
//!
//! A `PacketRecord` summarises one observed frame. Fields that only make sense
//! for some protocols are `Option`s so that "absent" never collapses into zero.

mod flags;
mod record;

pub use flags::TcpFlags;
pub use record::{PacketRecord, Protocol, ADDR_SENTINEL};
