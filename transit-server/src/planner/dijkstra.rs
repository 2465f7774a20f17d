//! Shortest-path engine.
//!
//! Dijkstra over one snapshot with the network's boarding-cost semantics:
//! departing a stop charges that stop's boarding cost once per boarding
//! event, on top of the edge weight. With non-negative weights the result
//! is a simple path, so no stop is departed twice and boarding is never
//! double-charged.
//!
//! Equal-cost frontier entries expand in ascending node order, so the
//! output is identical across runs on identical input.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::GraphSnapshot;

/// Error from path computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Caller passed an index outside the snapshot's node range.
    #[error("node index {index} out of range (snapshot has {node_count} nodes)")]
    InvalidNodeIndex { index: usize, node_count: usize },
}

/// A minimum-cost path between two node indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    /// Node indices from origin to destination, inclusive.
    pub nodes: Vec<usize>,
    /// Cost of each traversal: the edge weight plus the boarding charge
    /// applied when departing that edge's origin.
    pub edge_costs: Vec<u64>,
    /// Sum of `edge_costs`.
    pub total_cost: u64,
}

/// Computes a minimum-cost path from `from` to `to` over `snapshot`.
///
/// Returns `Ok(None)` when the nodes are disconnected — callers
/// distinguish "no route" from bad input. An origin equal to the
/// destination yields the trivial single-node path with cost 0.
pub fn shortest_path(
    snapshot: &GraphSnapshot,
    from: usize,
    to: usize,
) -> Result<Option<RoutePath>, RouteError> {
    let node_count = snapshot.node_count();
    for index in [from, to] {
        if index >= node_count {
            return Err(RouteError::InvalidNodeIndex { index, node_count });
        }
    }

    if from == to {
        return Ok(Some(RoutePath {
            nodes: vec![from],
            edge_costs: Vec::new(),
            total_cost: 0,
        }));
    }

    let mut dist: Vec<Option<u64>> = vec![None; node_count];
    // (predecessor node, edge index taken from it)
    let mut prev: Vec<Option<(usize, u32)>> = vec![None; node_count];
    let mut done = vec![false; node_count];
    let mut frontier = BinaryHeap::new();

    dist[from] = Some(0);
    frontier.push(Reverse((0u64, from)));

    while let Some(Reverse((cost, node))) = frontier.pop() {
        if done[node] {
            continue; // superseded frontier entry
        }
        done[node] = true;
        if node == to {
            break;
        }

        let boarding = snapshot.nodes()[node].boarding_charge();
        for &edge_index in snapshot.outgoing(node) {
            let edge = snapshot.edge(edge_index as usize);
            let next = edge.to as usize;
            if done[next] {
                continue;
            }
            let alt = cost + edge.weight + boarding;
            if dist[next].is_none_or(|d| alt < d) {
                dist[next] = Some(alt);
                prev[next] = Some((node, edge_index));
                frontier.push(Reverse((alt, next)));
            }
        }
    }

    let Some(total_cost) = dist[to].filter(|_| done[to]) else {
        return Ok(None);
    };

    // walk the predecessor chain back to the origin
    let mut nodes = vec![to];
    let mut edge_costs = Vec::new();
    let mut cursor = to;
    while let Some((predecessor, edge_index)) = prev[cursor] {
        let edge = snapshot.edge(edge_index as usize);
        edge_costs.push(edge.weight + snapshot.nodes()[predecessor].boarding_charge());
        nodes.push(predecessor);
        cursor = predecessor;
    }
    nodes.reverse();
    edge_costs.reverse();

    Ok(Some(RoutePath {
        nodes,
        edge_costs,
        total_cost,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::snapshot::{Edge, Node, SnapshotMetadata};
    use crate::graph::{GraphSnapshot, TimeBand};
    use proptest::prelude::*;

    fn snapshot(boarding: &[f64], edges: &[(u32, u32, u64)]) -> GraphSnapshot {
        let nodes: Vec<Node> = boarding
            .iter()
            .enumerate()
            .map(|(i, &cost)| Node {
                id: format!("tcl:{i}"),
                name: format!("Stop {i}"),
                x: 4.8 + i as f64 * 0.01,
                y: 45.7,
                modes: vec!["metro".to_string()],
                boarding_cost: cost,
            })
            .collect();
        let edges: Vec<Edge> = edges
            .iter()
            .map(|&(from, to, weight)| Edge { from, to, weight })
            .collect();
        let metadata = SnapshotMetadata {
            period: "day_offpeak".to_string(),
            node_count: nodes.len(),
            edge_count: edges.len(),
        };
        GraphSnapshot::new(TimeBand::DayOffpeak, metadata, nodes, edges).unwrap()
    }

    #[test]
    fn lyon_three_stop_line() {
        // Perrache(0) -> Bellecour(1) -> Part-Dieu(2), no boarding costs
        let snapshot = snapshot(&[0.0, 0.0, 0.0], &[(0, 1, 300), (1, 2, 400)]);

        let path = shortest_path(&snapshot, 0, 2).unwrap().unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.edge_costs, vec![300, 400]);
        assert_eq!(path.total_cost, 700);
    }

    #[test]
    fn boarding_charged_per_departure() {
        // 120s boarding at the origin, 90s when changing at node 1
        let snapshot = snapshot(&[120.0, 90.0, 0.0], &[(0, 1, 300), (1, 2, 400)]);

        let path = shortest_path(&snapshot, 0, 2).unwrap().unwrap();
        assert_eq!(path.edge_costs, vec![300 + 120, 400 + 90]);
        assert_eq!(path.total_cost, 910);
    }

    #[test]
    fn boarding_cost_steers_route_choice() {
        // two routes 0->3: via 1 (cheap edges, expensive interchange)
        // and via 2 (dearer edges, free interchange)
        let snapshot = snapshot(
            &[0.0, 600.0, 0.0, 0.0],
            &[(0, 1, 100), (1, 3, 100), (0, 2, 250), (2, 3, 250)],
        );

        let path = shortest_path(&snapshot, 0, 3).unwrap().unwrap();
        assert_eq!(path.nodes, vec![0, 2, 3]);
        assert_eq!(path.total_cost, 500);
    }

    #[test]
    fn trivial_path_costs_nothing() {
        // boarding cost must not apply when there is nothing to board
        let snapshot = snapshot(&[120.0, 0.0], &[(0, 1, 300)]);

        let path = shortest_path(&snapshot, 0, 0).unwrap().unwrap();
        assert_eq!(path.nodes, vec![0]);
        assert!(path.edge_costs.is_empty());
        assert_eq!(path.total_cost, 0);
    }

    #[test]
    fn disconnected_is_none_not_error() {
        let snapshot = snapshot(&[0.0, 0.0, 0.0], &[(0, 1, 300)]);

        assert_eq!(shortest_path(&snapshot, 0, 2).unwrap(), None);
        // direction matters on a directed graph
        assert_eq!(shortest_path(&snapshot, 1, 0).unwrap(), None);
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let snapshot = snapshot(&[0.0, 0.0], &[(0, 1, 300)]);

        let err = shortest_path(&snapshot, 0, 9).unwrap_err();
        assert_eq!(
            err,
            RouteError::InvalidNodeIndex {
                index: 9,
                node_count: 2
            }
        );
        assert!(shortest_path(&snapshot, 9, 0).is_err());
    }

    #[test]
    fn parallel_edges_take_the_cheaper() {
        let snapshot = snapshot(&[0.0, 0.0], &[(0, 1, 500), (0, 1, 320)]);

        let path = shortest_path(&snapshot, 0, 1).unwrap().unwrap();
        assert_eq!(path.edge_costs, vec![320]);
        assert_eq!(path.total_cost, 320);
    }

    #[test]
    fn equal_cost_tie_breaks_to_lower_index() {
        // two equal-cost routes 0->3: via 1 and via 2
        let snapshot = snapshot(
            &[0.0, 0.0, 0.0, 0.0],
            &[(0, 1, 100), (1, 3, 100), (0, 2, 100), (2, 3, 100)],
        );

        let first = shortest_path(&snapshot, 0, 3).unwrap().unwrap();
        let second = shortest_path(&snapshot, 0, 3).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.nodes, vec![0, 1, 3]);
    }

    #[test]
    fn takes_longer_path_when_cheaper() {
        // direct hop is dearer than the scenic route
        let snapshot = snapshot(
            &[0.0, 0.0, 0.0],
            &[(0, 2, 1000), (0, 1, 300), (1, 2, 400)],
        );

        let path = shortest_path(&snapshot, 0, 2).unwrap().unwrap();
        assert_eq!(path.nodes, vec![0, 1, 2]);
        assert_eq!(path.total_cost, 700);
    }

    proptest! {
        /// Any path the engine returns is self-consistent: endpoints match
        /// the query, per-edge costs sum to the total, and a second run
        /// agrees exactly.
        #[test]
        fn path_is_self_consistent(
            edges in proptest::collection::vec((0u32..8, 0u32..8, 1u64..900), 0..40),
            boarding in proptest::collection::vec(0.0f64..300.0, 8),
            from in 0usize..8,
            to in 0usize..8,
        ) {
            let snapshot = snapshot(&boarding, &edges);

            let result = shortest_path(&snapshot, from, to).unwrap();
            let again = shortest_path(&snapshot, from, to).unwrap();
            prop_assert_eq!(&result, &again);

            if let Some(path) = result {
                prop_assert_eq!(path.nodes.first(), Some(&from));
                prop_assert_eq!(path.nodes.last(), Some(&to));
                prop_assert_eq!(path.nodes.len(), path.edge_costs.len() + 1);
                prop_assert_eq!(path.total_cost, path.edge_costs.iter().sum::<u64>());
                // simple path: no node repeats, so boarding is charged once each
                let mut seen = path.nodes.clone();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), path.nodes.len());
            }
        }
    }
}
