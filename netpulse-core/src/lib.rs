//! # netpulse-core
//!
//! Foundation layer shared by every netpulse crate: the packet record model,
//! the session packet store and the cooperative stop signal used by sources.
//!
//! ### Key Submodules:
//! - `packet`: `PacketRecord`, `Protocol` and `TcpFlags`
//! - `store`: `PacketStore`, a mutex-guarded append-only sequence with
//!   copy-on-read snapshots and cursor-based incremental reads
//! - `stop`: `StopToken`, a cancellation flag that sources can also sleep on

pub mod packet;
pub mod stop;
pub mod store;

pub mod prelude {
    pub use crate::packet::*;
    pub use crate::stop::StopToken;
    pub use crate::store::*;
}

pub use packet::{PacketRecord, Protocol, TcpFlags, ADDR_SENTINEL};
pub use stop::StopToken;
pub use store::{PacketStore, StoreCursor, StoreDelta};
