//! Immutable network snapshots.
//!
//! A snapshot is one time band's network: stops and weighted directed
//! edges, deserialized from the generator's JSON document. A snapshot is
//! validated on load (declared counts must match, edge endpoints must be
//! in range) and never mutated afterwards, so it can be shared between
//! concurrent path queries as an `Arc` without locking.

use serde::Deserialize;
use serde::de::Deserializer;

use super::band::TimeBand;
use super::error::SnapshotError;

/// Declared snapshot header, checked against the actual collections.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMetadata {
    /// Service period tag written by the generator.
    pub period: String,
    pub node_count: usize,
    pub edge_count: usize,
}

/// A stop or platform in the network.
///
/// The node's position in the snapshot's node array is its identifier for
/// the lifetime of the snapshot; `id` is the external stable identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: String,
    /// Display name.
    pub name: String,
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
    /// Transport mode tags reachable at this stop.
    #[serde(default)]
    pub modes: Vec<String>,
    /// Fixed cost in seconds charged when a journey boards here,
    /// modeling wait and transfer friction.
    #[serde(default)]
    pub boarding_cost: f64,
}

impl Node {
    /// Boarding cost in whole cost units, clamped non-negative.
    pub fn boarding_charge(&self) -> u64 {
        if self.boarding_cost.is_finite() && self.boarding_cost > 0.0 {
            self.boarding_cost.round() as u64
        } else {
            0
        }
    }
}

/// A directed weighted arc between two node indices.
///
/// Parallel edges between the same pair are permitted and represent
/// distinct service options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: u32,
    pub to: u32,
    /// Traversal cost in seconds.
    pub weight: u64,
}

impl<'de> Deserialize<'de> for Edge {
    // Wire shape is a bare triple: [fromIndex, toIndex, weight].
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (from, to, weight) = <(u32, u32, u64)>::deserialize(deserializer)?;
        Ok(Edge { from, to, weight })
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotDoc {
    metadata: SnapshotMetadata,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// One time band's network, fully loaded and validated.
#[derive(Debug)]
pub struct GraphSnapshot {
    band: TimeBand,
    metadata: SnapshotMetadata,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Outgoing edge indices per node, built once at load so repeated
    /// path queries never rescan the edge list.
    outgoing: Vec<Vec<u32>>,
}

impl GraphSnapshot {
    /// Deserialize and validate a snapshot document.
    pub fn from_slice(band: TimeBand, bytes: &[u8]) -> Result<Self, SnapshotError> {
        let doc: SnapshotDoc =
            serde_json::from_slice(bytes).map_err(|source| SnapshotError::Parse { band, source })?;
        Self::new(band, doc.metadata, doc.nodes, doc.edges)
    }

    /// Build a snapshot from already-parsed parts, enforcing the
    /// metadata-count and edge-endpoint invariants.
    pub fn new(
        band: TimeBand,
        metadata: SnapshotMetadata,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self, SnapshotError> {
        if metadata.node_count != nodes.len() {
            return Err(SnapshotError::CountMismatch {
                band,
                kind: "node",
                declared: metadata.node_count,
                actual: nodes.len(),
            });
        }
        if metadata.edge_count != edges.len() {
            return Err(SnapshotError::CountMismatch {
                band,
                kind: "edge",
                declared: metadata.edge_count,
                actual: edges.len(),
            });
        }

        let mut outgoing = vec![Vec::new(); nodes.len()];
        for (index, edge) in edges.iter().enumerate() {
            for endpoint in [edge.from, edge.to] {
                if endpoint as usize >= nodes.len() {
                    return Err(SnapshotError::EdgeOutOfBounds {
                        band,
                        edge: index,
                        index: endpoint as usize,
                        node_count: nodes.len(),
                    });
                }
            }
            outgoing[edge.from as usize].push(index as u32);
        }

        Ok(Self {
            band,
            metadata,
            nodes,
            edges,
            outgoing,
        })
    }

    /// The band this snapshot was generated for.
    pub fn band(&self) -> TimeBand {
        self.band
    }

    /// The generator's declared header.
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`, if in range.
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Edge at `index`. Indices come from [`GraphSnapshot::outgoing`] and
    /// are valid by construction.
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Indices of the edges departing `node`.
    pub fn outgoing(&self, node: usize) -> &[u32] {
        &self.outgoing[node]
    }
}
