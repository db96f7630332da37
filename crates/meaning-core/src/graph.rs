//! # Graph Contract
//!
//! The read-only graph interface the engine queries, and the seed-derived
//! implementation worlds fall back to.
//!
//! Hosts may back a graph with anything. The contract validator checks a
//! graph's declared capabilities separately from the trait, so a partial
//! host graph is reported instead of trusted.

use crate::{GraphEdge, GraphNode, SeedData};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CAPABILITIES
// =============================================================================

/// The four query capabilities a world graph must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphCapability {
    /// List all nodes.
    Nodes,
    /// List all edges.
    Edges,
    /// Look up a node by id.
    NodeById,
    /// Look up the neighbors of a node.
    Neighbors,
}

impl GraphCapability {
    /// Every capability, in the order the validator checks them.
    pub const ALL: [Self; 4] = [Self::Nodes, Self::Edges, Self::NodeById, Self::Neighbors];

    /// Name of the trait method providing this capability.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Nodes => "nodes",
            Self::Edges => "edges",
            Self::NodeById => "node_by_id",
            Self::Neighbors => "neighbors",
        }
    }
}

impl fmt::Display for GraphCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.method_name())
    }
}

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the read queries the engine runs.
///
/// Lookups never fail: unknown ids yield `None` or an empty list.
/// Every method returns owned values so callers cannot reach into the
/// store's own state.
pub trait GraphStore {
    /// Whether this graph actually provides `capability`.
    ///
    /// Hosts wrapping partial backends override this; a graph that reports
    /// a capability as missing fails contract validation.
    fn supports(&self, capability: GraphCapability) -> bool {
        let _ = capability;
        true
    }

    /// All nodes in a stable order.
    fn nodes(&self) -> Vec<GraphNode>;

    /// All edges in a stable order.
    fn edges(&self) -> Vec<GraphEdge>;

    /// A node by id.
    fn node_by_id(&self, id: &str) -> Option<GraphNode>;

    /// Ids of the nodes adjacent to `id`, edges taken as undirected.
    fn neighbors(&self, id: &str) -> Vec<String>;

    /// Number of nodes.
    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Number of edges.
    fn edge_count(&self) -> usize {
        self.edges().len()
    }
}

impl<G: GraphStore + ?Sized> GraphStore for &G {
    fn supports(&self, capability: GraphCapability) -> bool {
        (**self).supports(capability)
    }

    fn nodes(&self) -> Vec<GraphNode> {
        (**self).nodes()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        (**self).edges()
    }

    fn node_by_id(&self, id: &str) -> Option<GraphNode> {
        (**self).node_by_id(id)
    }

    fn neighbors(&self, id: &str) -> Vec<String> {
        (**self).neighbors(id)
    }

    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn edge_count(&self) -> usize {
        (**self).edge_count()
    }
}

// =============================================================================
// SEED GRAPH
// =============================================================================

/// A graph derived from seed nodes and edges.
///
/// Keeps the seed lists in their original order plus two indexes:
/// node id -> position, and node id -> adjacent ids (both directions of
/// every edge). When the seed repeats a node id, the last record wins the
/// index; the contract validator reports the duplicate.
#[derive(Debug, Clone, Default)]
pub struct SeedGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    node_index: BTreeMap<String, usize>,
    adjacency: BTreeMap<String, Vec<String>>,
}

impl SeedGraph {
    /// Build the graph and its indexes from seed data.
    #[must_use]
    pub fn from_seed(seed: &SeedData) -> Self {
        let mut node_index = BTreeMap::new();
        for (pos, node) in seed.nodes.iter().enumerate() {
            node_index.insert(node.id.clone(), pos);
        }

        let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for edge in &seed.edges {
            link(&mut adjacency, &edge.source, &edge.target);
            link(&mut adjacency, &edge.target, &edge.source);
        }

        Self {
            nodes: seed.nodes.clone(),
            edges: seed.edges.clone(),
            node_index,
            adjacency,
        }
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }
}

fn link(adjacency: &mut BTreeMap<String, Vec<String>>, from: &str, to: &str) {
    let neighbors = adjacency.entry(from.to_string()).or_default();
    if !neighbors.iter().any(|n| n == to) {
        neighbors.push(to.to_string());
    }
}

impl GraphStore for SeedGraph {
    fn nodes(&self) -> Vec<GraphNode> {
        self.nodes.clone()
    }

    fn edges(&self) -> Vec<GraphEdge> {
        self.edges.clone()
    }

    fn node_by_id(&self, id: &str) -> Option<GraphNode> {
        self.node_index
            .get(id)
            .and_then(|&pos| self.nodes.get(pos))
            .cloned()
    }

    fn neighbors(&self, id: &str) -> Vec<String> {
        self.adjacency.get(id).cloned().unwrap_or_default()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
