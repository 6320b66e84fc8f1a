//! An in-memory network of routing tables. Advertisements are assembled and
//! delivered without sockets, and every timer runs on a synthetic clock, so
//! whole convergence scenarios execute instantly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rip_core::neighbour::Neighbour;
use rip_core::table::{RoutingTable, UpdateTrigger};
use rip_core::update::{apply_response, build_response};
use rip_core::wire::RawEntry;
use rip_core::RouterId;

/// Records whether the table asked for a triggered update.
#[derive(Clone, Default)]
pub struct TriggerFlag(Rc<Cell<bool>>);

impl TriggerFlag {
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

impl UpdateTrigger for TriggerFlag {
    fn trigger_update(&self) {
        self.0.set(true);
    }
}

pub struct VirtualNode {
    pub id: RouterId,
    pub neighbours: Vec<Neighbour>,
    pub table: RoutingTable,
    pub trigger: TriggerFlag,
    /// Silenced nodes neither send nor receive, like a crashed process.
    pub silenced: bool,
}

pub struct VirtualNetwork {
    pub nodes: Vec<VirtualNode>,
    start: Instant,
    elapsed: Duration,
}

impl VirtualNetwork {
    /// Builds a network from undirected weighted links `(a, b, metric)`.
    /// Port numbers are synthesised; they are never bound.
    pub fn create(links: &[(RouterId, RouterId, u16)], update_period: Duration) -> Self {
        let start = Instant::now();
        let mut ids: Vec<RouterId> = links.iter().flat_map(|&(a, b, _)| [a, b]).collect();
        ids.sort_unstable();
        ids.dedup();

        let nodes = ids
            .iter()
            .map(|&id| {
                let neighbours: Vec<Neighbour> = links
                    .iter()
                    .filter_map(|&(a, b, metric)| {
                        let peer = if a == id {
                            Some(b)
                        } else if b == id {
                            Some(a)
                        } else {
                            None
                        }?;
                        Some(Neighbour {
                            id: peer,
                            link_metric: metric,
                            input_port: 5000 + peer,
                        })
                    })
                    .collect();
                let trigger = TriggerFlag::default();
                let table = RoutingTable::new(
                    id,
                    &neighbours,
                    update_period,
                    Box::new(trigger.clone()),
                    start,
                );
                VirtualNode {
                    id,
                    neighbours,
                    table,
                    trigger,
                    silenced: false,
                }
            })
            .collect();

        VirtualNetwork {
            nodes,
            start,
            elapsed: Duration::ZERO,
        }
    }

    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Moves the synthetic clock forward and sweeps every node's timers.
    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
        let now = self.now();
        for node in &mut self.nodes {
            node.table.check_timers(now);
        }
    }

    /// Every live node sends one response to each of its neighbours, as a
    /// periodic update would; delivery is immediate.
    pub fn exchange(&mut self) {
        let now = self.now();
        let mut deliveries: Vec<(RouterId, RouterId, Vec<RawEntry>)> = Vec::new();
        for node in &self.nodes {
            if node.silenced {
                continue;
            }
            for neighbour in &node.neighbours {
                let entries: Vec<RawEntry> = build_response(&node.table, neighbour.id)
                    .into_iter()
                    .map(|(dest_id, metric)| RawEntry {
                        dest_id: dest_id as u32,
                        metric: metric as u32,
                    })
                    .collect();
                deliveries.push((neighbour.id, node.id, entries));
            }
        }

        for (to, from, entries) in deliveries {
            let node = self.node_mut(to);
            if node.silenced {
                continue;
            }
            let rejected = apply_response(&mut node.table, from, &entries, now);
            assert!(rejected.is_empty(), "well-formed advertisements only");
        }
    }

    /// One exchange per node pair, `n` times, advancing the clock a little
    /// between rounds so timeouts stay realistic.
    pub fn converge(&mut self, rounds: u32) {
        for _ in 0..rounds {
            self.exchange();
            self.advance(Duration::from_millis(100));
        }
    }

    pub fn node(&self, id: RouterId) -> &VirtualNode {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .unwrap_or_else(|| panic!("no node {id}"))
    }

    pub fn node_mut(&mut self, id: RouterId) -> &mut VirtualNode {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .unwrap_or_else(|| panic!("no node {id}"))
    }

    pub fn silence(&mut self, id: RouterId) {
        self.node_mut(id).silenced = true;
    }

    pub fn metric_to(&self, at: RouterId, dest: RouterId) -> u16 {
        self.node(at).table.metric(dest)
    }

    pub fn next_hop(&self, at: RouterId, dest: RouterId) -> RouterId {
        self.node(at).table.next_hop(dest)
    }
}

/// Checks the universal route invariants on every node.
pub fn assert_invariants(network: &VirtualNetwork) {
    for node in &network.nodes {
        for (dest_id, metric, _next_hop) in node.table.routes() {
            assert_ne!(dest_id, node.id, "route to self at node {}", node.id);
            assert!(
                (1..=rip_core::INFINITY).contains(&metric),
                "metric {metric} out of range at node {}",
                node.id
            );
            if node.table.is_collecting(dest_id) {
                assert_eq!(metric, rip_core::INFINITY);
            }
        }
    }
}
