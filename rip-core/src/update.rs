//! The distance-vector update rule, and advertisement assembly.
//!
//! Ingest mutates the routing table; assembly reads it. Transmission and
//! header validation stay with the daemon, so everything here is plain
//! synchronous state manipulation.

use std::time::Instant;

use crate::feedback::EntryRejection;
use crate::table::RoutingTable;
use crate::util::{sum_metric, valid_metric, valid_router_id};
use crate::wire::RawEntry;
use crate::{RouterId, INFINITY};

/// Ingests one response whose header the caller has already validated.
///
/// The packet having arrived at all proves the direct link to the sender is
/// up, so the sender itself is processed first as a zero-metric destination.
/// Entries with an out-of-range destination or metric are skipped and
/// reported; the rest of the packet still applies.
pub fn apply_response(
    table: &mut RoutingTable,
    sender_id: RouterId,
    entries: &[RawEntry],
    now: Instant,
) -> Vec<EntryRejection> {
    apply_update(table, sender_id, sender_id, 0, now);

    let mut rejected = Vec::new();
    for entry in entries {
        if !valid_router_id(entry.dest_id) {
            rejected.push(EntryRejection::DestinationOutOfRange(entry.dest_id));
            continue;
        }
        if !valid_metric(entry.metric) {
            rejected.push(EntryRejection::MetricOutOfRange(entry.metric));
            continue;
        }
        apply_update(table, sender_id, entry.dest_id as RouterId, entry.metric as u16, now);
    }
    rejected
}

/// Applies one advertised `(destination, metric)` pair from a neighbour.
///
/// The advertised metric is charged the cost of the link it arrived on,
/// saturating at [`INFINITY`]. A strictly better metric replaces the
/// current route; an equal metric from a different neighbour does not, so
/// routes do not flap between equal-cost paths. The current next hop is
/// authoritative: it may raise, lower, or poison the route, and any word
/// from it rearms the route's timeout.
pub fn apply_update(
    table: &mut RoutingTable,
    sender_id: RouterId,
    dest_id: RouterId,
    metric_sent: u16,
    now: Instant,
) {
    let Some(link_metric) = table.metric_to_neighbour(sender_id) else {
        return;
    };
    let metric = sum_metric(link_metric, metric_sent);

    if dest_id == table.local_id() {
        return;
    }

    if table.has_route(dest_id) {
        let cur_metric = table.metric(dest_id);
        let cur_next_hop = table.next_hop(dest_id);

        if sender_id == cur_next_hop {
            table.reset_timeout(dest_id, now);
        }

        if (sender_id == cur_next_hop && metric != cur_metric) || metric < cur_metric {
            table.set_next_hop(dest_id, sender_id);
            table.set_metric(dest_id, metric);
            if metric == INFINITY {
                table.start_deletion(dest_id, now);
            } else {
                table.reset_timeout(dest_id, now);
            }
        }
    } else if metric != INFINITY {
        table.add_entry(dest_id, metric, sender_id, now);
    }
}

/// Assembles the advertisement for one neighbour: every route in the table,
/// with split horizon / poison reverse applied: a route whose next hop is
/// that neighbour is advertised back to it as unreachable.
///
/// Entries come out sorted by destination so identical tables produce
/// identical packets.
pub fn build_response(table: &RoutingTable, neighbour_id: RouterId) -> Vec<(RouterId, u16)> {
    let mut entries: Vec<(RouterId, u16)> = table
        .routes()
        .map(|(dest_id, metric, next_hop)| {
            if next_hop == neighbour_id {
                (dest_id, INFINITY)
            } else {
                (dest_id, metric)
            }
        })
        .collect();
    entries.sort_unstable_by_key(|&(dest_id, _)| dest_id);
    entries
}
