use std::time::Duration;

use super::virtual_network::VirtualNetwork;

/// The two-neighbour star used across the scenario tests:
/// router 1 linked to router 2 (cost 1) and router 3 (cost 5).
pub fn two_neighbour_star() -> VirtualNetwork {
    VirtualNetwork::create(&[(1, 2, 1), (1, 3, 5)], Duration::from_secs(1))
}

/// A weighted ring with one expensive chord, for route-selection tests.
///
/// ```text
///   1 --2-- 2
///   |       |
///   1       5
///   |       |
///   3 --8-- 5 --1-- 4
/// ```
pub fn weighted_mesh() -> VirtualNetwork {
    VirtualNetwork::create(
        &[
            (1, 2, 2),
            (1, 3, 1),
            (2, 3, 4),
            (2, 4, 5),
            (3, 5, 8),
            (4, 5, 1),
        ],
        Duration::from_secs(1),
    )
}

/// Four routers in a row, unit cost per hop.
pub fn chain_of_four() -> VirtualNetwork {
    VirtualNetwork::create(&[(1, 2, 1), (2, 3, 1), (3, 4, 1)], Duration::from_secs(1))
}
