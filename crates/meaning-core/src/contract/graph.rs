//! Graph contract: capabilities, referential integrity, schema conformance.

use crate::graph::{GraphCapability, GraphStore};
use crate::{Schema, ValidationResult};
use std::collections::BTreeSet;

/// Checks a graph before the engine queries it.
pub struct GraphValidator;

impl GraphValidator {
    /// Check that the graph provides every query capability and that its
    /// data is self-consistent: node ids present and unique, every edge
    /// endpoint referencing a node of the same graph.
    ///
    /// Each missing capability is reported on its own. Integrity checks only
    /// run when both listing capabilities are present.
    #[must_use]
    pub fn validate<G: GraphStore + ?Sized>(graph: &G) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for capability in GraphCapability::ALL {
            if !graph.supports(capability) {
                result.error(format!("Graph must provide {capability}"));
            }
        }

        if !(graph.supports(GraphCapability::Nodes) && graph.supports(GraphCapability::Edges)) {
            return result;
        }

        let nodes = graph.nodes();
        let mut ids = BTreeSet::new();
        for (index, node) in nodes.iter().enumerate() {
            if node.id.is_empty() {
                result.error(format!("Node at index {index} has no id"));
            } else if !ids.insert(node.id.as_str()) {
                result.error(format!("Duplicate node id: {}", node.id));
            }
        }

        for (index, edge) in graph.edges().iter().enumerate() {
            for (end, node_id) in [("source", &edge.source), ("target", &edge.target)] {
                if node_id.is_empty() {
                    result.error(format!("Edge at index {index} has no {end}"));
                } else if !ids.contains(node_id.as_str()) {
                    result.error(format!(
                        "Edge at index {index} references unknown {end} node '{node_id}'"
                    ));
                }
            }
        }

        result
    }

    /// Check every node type and edge type against the schema, one error
    /// per offending record.
    #[must_use]
    pub fn validate_against_schema<G: GraphStore + ?Sized>(
        graph: &G,
        schema: &Schema,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if graph.supports(GraphCapability::Nodes) {
            for node in graph.nodes() {
                if !schema.is_valid_node_type(node.type_name()) {
                    result.error(format!(
                        "Node '{}' has invalid type: {}",
                        node.id,
                        node.type_name()
                    ));
                }
            }
        }

        if graph.supports(GraphCapability::Edges) {
            for (index, edge) in graph.edges().iter().enumerate() {
                if !schema.is_valid_edge_type(edge.type_name()) {
                    result.error(format!(
                        "Edge at index {index} ({} -> {}) has invalid type: {}",
                        edge.source,
                        edge.target,
                        edge.type_name()
                    ));
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SeedGraph;
    use crate::{GraphEdge, GraphNode, SeedData};

    /// A host graph that cannot answer neighbor lookups.
    struct NoNeighbors(SeedGraph);

    impl GraphStore for NoNeighbors {
        fn supports(&self, capability: GraphCapability) -> bool {
            capability != GraphCapability::Neighbors
        }
        fn nodes(&self) -> Vec<GraphNode> {
            self.0.nodes()
        }
        fn edges(&self) -> Vec<GraphEdge> {
            self.0.edges()
        }
        fn node_by_id(&self, id: &str) -> Option<GraphNode> {
            self.0.node_by_id(id)
        }
        fn neighbors(&self, _id: &str) -> Vec<String> {
            Vec::new()
        }
    }

    fn seed_graph(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> SeedGraph {
        SeedGraph::from_seed(&SeedData::new(nodes, edges))
    }

    #[test]
    fn missing_capability_named() {
        let graph = NoNeighbors(seed_graph(vec![], vec![]));
        let result = GraphValidator::validate(&graph);
        assert_eq!(result.errors, vec!["Graph must provide neighbors()"]);
    }

    #[test]
    fn dangling_edges_are_errors() {
        let graph = seed_graph(
            vec![GraphNode::new("a", "node")],
            vec![GraphEdge::new("a", "ghost", "link")],
        );
        let result = GraphValidator::validate(&graph);
        assert!(!result.valid);
        assert!(result.errors[0].contains("unknown target node 'ghost'"));
    }

    #[test]
    fn duplicate_node_ids_are_errors() {
        let graph = seed_graph(
            vec![GraphNode::new("a", "node"), GraphNode::new("a", "node")],
            vec![],
        );
        let result = GraphValidator::validate(&graph);
        assert_eq!(result.errors, vec!["Duplicate node id: a"]);
    }

    #[test]
    fn schema_cross_check_reports_each_record() {
        let schema = Schema::minimal();
        let graph = seed_graph(
            vec![
                GraphNode::new("a", "node"),
                GraphNode::new("b", "planet"),
                GraphNode::new("c", "star"),
            ],
            vec![
                GraphEdge::new("a", "b", "link"),
                GraphEdge::new("b", "c", "orbits"),
            ],
        );
        let result = GraphValidator::validate_against_schema(&graph, &schema);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().any(|e| e.contains("'b' has invalid type: planet")));
        assert!(result.errors.iter().any(|e| e.contains("has invalid type: orbits")));
    }
}
