//! The routing table and its per-entry timer lifecycle.
//!
//! An entry is alive while its timeout timer runs, is poisoned (metric
//! pinned at [`INFINITY`]) once the timeout expires or a retraction arrives,
//! and is removed when the garbage-collection timer that started at
//! poisoning expires.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::neighbour::{Neighbour, NeighbourMap};
use crate::{RouterId, INFINITY};

/// Ratio of the timeout period to the update period.
const TIMEOUT_PERIOD_RATIO: u32 = 6;

/// Ratio of the garbage-collection period to the update period.
const GC_PERIOD_RATIO: u32 = 4;

/// Capability injected into the table so it can ask its owner for a
/// triggered update when a route is poisoned, without holding a reference
/// back to the owner.
pub trait UpdateTrigger {
    fn trigger_update(&self);
}

/// One route. Private to the table; callers go through the typed accessors
/// keyed by destination id.
struct Entry {
    metric: u16,
    next_hop: RouterId,
    /// When the entry goes stale. Meaningful only while `gc_at` is `None`.
    timeout_at: Instant,
    /// When the entry must be removed. `Some` iff garbage collection has
    /// started, which pins `metric` at [`INFINITY`].
    gc_at: Option<Instant>,
}

pub struct RoutingTable {
    local_id: RouterId,
    entries: HashMap<RouterId, Entry>,
    neighbours: NeighbourMap,
    timeout_period: Duration,
    gc_period: Duration,
    trigger: Box<dyn UpdateTrigger>,
}

impl RoutingTable {
    /// Builds the table seeded with one directly attached route per
    /// configured neighbour, each timeout armed.
    pub fn new(
        local_id: RouterId,
        neighbours: &[Neighbour],
        update_period: Duration,
        trigger: Box<dyn UpdateTrigger>,
        now: Instant,
    ) -> Self {
        let mut table = Self {
            local_id,
            entries: HashMap::new(),
            neighbours: NeighbourMap::new(neighbours),
            timeout_period: update_period * TIMEOUT_PERIOD_RATIO,
            gc_period: update_period * GC_PERIOD_RATIO,
            trigger,
        };
        for n in neighbours {
            table.add_entry(n.id, n.link_metric, n.id, now);
        }
        table
    }

    pub fn local_id(&self) -> RouterId {
        self.local_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_route(&self, dest_id: RouterId) -> bool {
        self.entries.contains_key(&dest_id)
    }

    /// Iterates over `(destination, metric, next hop)` for every route,
    /// poisoned ones included.
    pub fn routes(&self) -> impl Iterator<Item = (RouterId, u16, RouterId)> + '_ {
        self.entries
            .iter()
            .map(|(id, e)| (*id, e.metric, e.next_hop))
    }

    // The accessors below assume the route exists; asking about an absent
    // destination is a caller bug, not a runtime condition.

    pub fn metric(&self, dest_id: RouterId) -> u16 {
        self.entries[&dest_id].metric
    }

    pub fn set_metric(&mut self, dest_id: RouterId, metric: u16) {
        self.entry_mut(dest_id).metric = metric;
    }

    pub fn next_hop(&self, dest_id: RouterId) -> RouterId {
        self.entries[&dest_id].next_hop
    }

    pub fn set_next_hop(&mut self, dest_id: RouterId, next_hop: RouterId) {
        self.entry_mut(dest_id).next_hop = next_hop;
    }

    pub fn is_collecting(&self, dest_id: RouterId) -> bool {
        self.entries[&dest_id].gc_at.is_some()
    }

    pub fn is_neighbour(&self, id: RouterId) -> bool {
        self.neighbours.contains(id)
    }

    pub fn metric_to_neighbour(&self, id: RouterId) -> Option<u16> {
        self.neighbours.link_metric(id)
    }

    /// Inserts a route for a destination the table has never seen (or whose
    /// previous entry was removed), arming its timeout.
    pub fn add_entry(&mut self, dest_id: RouterId, metric: u16, next_hop: RouterId, now: Instant) {
        debug_assert!(!self.has_route(dest_id), "duplicate route for {dest_id}");
        self.entries.insert(
            dest_id,
            Entry {
                metric,
                next_hop,
                timeout_at: now + self.timeout_period,
                gc_at: None,
            },
        );
    }

    /// Rearms the timeout for a route, cancelling garbage collection if it
    /// was running. A route coming out of collection keeps whatever metric
    /// it currently has, so set the metric first when reinstating.
    pub fn reset_timeout(&mut self, dest_id: RouterId, now: Instant) {
        let timeout_at = now + self.timeout_period;
        let entry = self.entry_mut(dest_id);
        entry.timeout_at = timeout_at;
        entry.gc_at = None;
    }

    /// Poisons a route and starts its garbage-collection timer, asking the
    /// owner to schedule a triggered update. Calling again while collection
    /// is already running does nothing; in particular the timer is not
    /// restarted.
    pub fn start_deletion(&mut self, dest_id: RouterId, now: Instant) {
        let gc_at = now + self.gc_period;
        let entry = self.entry_mut(dest_id);
        if entry.gc_at.is_some() {
            return;
        }
        entry.gc_at = Some(gc_at);
        entry.metric = INFINITY;
        self.trigger.trigger_update();
    }

    /// Sweeps every entry: stale routes are poisoned, routes whose
    /// garbage-collection timer has expired are removed. Returns the
    /// removed destination ids so the owner can report them.
    pub fn check_timers(&mut self, now: Instant) -> Vec<RouterId> {
        let mut stale = Vec::new();
        let mut expired = Vec::new();
        for (id, entry) in &self.entries {
            match entry.gc_at {
                None if now > entry.timeout_at => stale.push(*id),
                Some(gc_at) if now > gc_at => expired.push(*id),
                _ => {}
            }
        }

        for id in stale {
            self.start_deletion(id, now);
        }
        for id in &expired {
            self.entries.remove(id);
        }
        expired
    }

    /// Renders the table as a columned text block, with the seconds left on
    /// each timer (`-` for a timer that is not running).
    pub fn render(&self, now: Instant) -> String {
        let separator = format!("{}\n", "-".repeat(77));
        let mut out = String::new();
        out.push_str(&separator);
        out.push_str(&format!("Router {}\n", self.local_id));
        out.push_str(&separator);
        out.push_str(&format!(
            "{:<13} | {:<13} | {:<13} | {:<13} | {:<13}\n",
            "Dest ID", "Next Hop ID", "Metric", "Timeout Timer", "GC Timer"
        ));
        out.push_str(&separator);

        let mut ids: Vec<RouterId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let entry = &self.entries[&id];
            let timeout = match entry.gc_at {
                None => remaining(entry.timeout_at, now),
                Some(_) => "-".to_string(),
            };
            let gc = match entry.gc_at {
                None => "-".to_string(),
                Some(gc_at) => remaining(gc_at, now),
            };
            out.push_str(&format!(
                "{:<13} | {:<13} | {:<13} | {:<13} | {:<13}\n",
                id, entry.next_hop, entry.metric, timeout, gc
            ));
        }
        out
    }

    fn entry_mut(&mut self, dest_id: RouterId) -> &mut Entry {
        self.entries
            .get_mut(&dest_id)
            .expect("no route for destination")
    }

    /// Full entry state, for asserting that redelivery leaves the table
    /// untouched.
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<(RouterId, u16, RouterId, Instant, Option<Instant>)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|(id, e)| (*id, e.metric, e.next_hop, e.timeout_at, e.gc_at))
            .collect();
        all.sort_unstable_by_key(|(id, ..)| *id);
        all
    }
}

fn remaining(deadline: Instant, now: Instant) -> String {
    match deadline.checked_duration_since(now) {
        Some(left) => left.as_secs().to_string(),
        None => "-".to_string(),
    }
}
