use std::collections::HashMap;

use crate::RouterId;

/// A directly linked router, declared in the configuration and fixed for the
/// life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbour {
    pub id: RouterId,
    /// Cost of the direct link to this neighbour. Lower is better; never
    /// below 1.
    pub link_metric: u16,
    /// The port this neighbour receives datagrams on.
    pub input_port: u16,
}

/// Read-only `id -> link metric` view of the configured neighbours.
///
/// Kept apart from the routing table so the link cost stays defined after a
/// crashed neighbour's route has been garbage-collected out of the table.
#[derive(Debug, Clone, Default)]
pub struct NeighbourMap {
    metrics: HashMap<RouterId, u16>,
}

impl NeighbourMap {
    pub fn new(neighbours: &[Neighbour]) -> Self {
        Self {
            metrics: neighbours.iter().map(|n| (n.id, n.link_metric)).collect(),
        }
    }

    pub fn contains(&self, id: RouterId) -> bool {
        self.metrics.contains_key(&id)
    }

    pub fn link_metric(&self, id: RouterId) -> Option<u16> {
        self.metrics.get(&id).copied()
    }
}
