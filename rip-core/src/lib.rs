//! Protocol core for a RIP-style distance-vector routing daemon.
//!
//! Everything in this crate is synchronous and socket-free: the routing
//! table, the update rule applied to a neighbour's advertisement, and the
//! response-packet codec. The daemon owns the I/O and drives this state
//! machine from a single loop.

pub mod feedback;
pub mod neighbour;
pub mod table;
pub mod update;
pub mod util;
pub mod wire;

/// Identifies one router in the virtual topology.
pub type RouterId = u16;

/// The metric sentinel marking an unreachable destination. Metric sums
/// saturate here and never exceed it.
pub const INFINITY: u16 = 16;

pub const MIN_ROUTER_ID: u16 = 1;
pub const MAX_ROUTER_ID: u16 = 64000;

/// Datagram ports usable for virtual links; everything below 1024 is left
/// to the host system.
pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 64000;
