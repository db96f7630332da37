//! # Engine Facade
//!
//! The single entry point a host talks to once a world is built.
//!
//! An [`Engine`] only exists for a world that passed contract validation.
//! Catalog-backed features are optional: the registry and operators are
//! built on first use, and only when the world exposes catalogs. Without
//! them, catalog queries return empty results instead of failing.

use crate::contract::WorldValidator;
use crate::graph::GraphStore;
use crate::operators::{self, OperatorEngine};
use crate::primitives::ENGINE_VERSION;
use crate::query::{AttrQuery, ProjectOptions};
use crate::registry::{CatalogRegistry, RegistryStats};
use crate::schema::{EdgeTypeDef, NodeTypeDef};
use crate::world::World;
use crate::{CatalogEntry, EdgeCheck, EngineError, GraphEdge, GraphNode, Schema, ValidationResult};
use serde::Serialize;
use std::sync::OnceLock;

// =============================================================================
// STATISTICS
// =============================================================================

/// Aggregate engine statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub engine_version: String,
    pub world_name: String,
    pub world_version: String,
    pub node_type_count: usize,
    pub edge_type_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalogs: Option<RegistryStats>,
}

// =============================================================================
// ENGINE
// =============================================================================

/// A validated world plus the lazily built catalog layer.
pub struct Engine<W: World> {
    world: W,
    registry: OnceLock<Option<CatalogRegistry>>,
}

impl<W: World> Engine<W> {
    /// Validate `world` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWorld`] carrying every validator error
    /// if the world fails its contract.
    pub fn new(world: W) -> Result<Self, EngineError> {
        let validation = WorldValidator::validate(&world);
        if !validation.valid {
            return Err(EngineError::InvalidWorld(validation.errors));
        }
        for warning in &validation.warnings {
            tracing::debug!(warning = warning.as_str(), "world validation warning");
        }

        let engine = Self {
            world,
            registry: OnceLock::new(),
        };
        tracing::debug!(world = engine.world_name(), "engine ready");
        Ok(engine)
    }

    #[must_use]
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Give the world back.
    #[must_use]
    pub fn into_world(self) -> W {
        self.world
    }

    /// Re-run contract validation against the wrapped world.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        WorldValidator::validate(&self.world)
    }

    // =========================================================================
    // SCHEMA QUERIES
    // =========================================================================

    fn schema(&self) -> Option<&Schema> {
        self.world.schema().ok()
    }

    fn world_name(&self) -> &str {
        self.schema().map_or("", Schema::name)
    }

    #[must_use]
    pub fn is_valid_node_type(&self, node_type: &str) -> bool {
        self.schema().is_some_and(|s| s.is_valid_node_type(node_type))
    }

    #[must_use]
    pub fn is_valid_edge_type(&self, edge_type: &str) -> bool {
        self.schema().is_some_and(|s| s.is_valid_edge_type(edge_type))
    }

    #[must_use]
    pub fn node_type_definition(&self, node_type: &str) -> Option<&NodeTypeDef> {
        self.schema()?.node_type_definition(node_type)
    }

    #[must_use]
    pub fn edge_type_definition(&self, edge_type: &str) -> Option<&EdgeTypeDef> {
        self.schema()?.edge_type_definition(edge_type)
    }

    #[must_use]
    pub fn node_types(&self) -> &[NodeTypeDef] {
        self.schema().map(Schema::node_types).unwrap_or_default()
    }

    #[must_use]
    pub fn edge_types(&self) -> &[EdgeTypeDef] {
        self.schema().map(Schema::edge_types).unwrap_or_default()
    }

    #[must_use]
    pub fn is_edge_allowed(
        &self,
        edge_type: &str,
        source_type: &str,
        target_type: &str,
    ) -> EdgeCheck {
        match self.schema() {
            Some(schema) => schema.is_edge_allowed(edge_type, source_type, target_type),
            None => EdgeCheck::denied(format!("Unknown edge type: {edge_type}")),
        }
    }

    /// Whether the graph already holds as many nodes of `node_type` as its
    /// `maxCount` allows.
    #[must_use]
    pub fn is_node_type_limit_reached(&self, node_type: &str) -> bool {
        let count = self.nodes_of_type(node_type).len() as u64;
        self.schema()
            .is_some_and(|s| s.is_node_type_limit_reached(node_type, count))
    }

    #[must_use]
    pub fn validate_node(&self, node: &GraphNode) -> ValidationResult {
        match self.schema() {
            Some(schema) => schema.validate_node(node),
            None => {
                ValidationResult::from_parts(vec!["Schema unavailable".to_string()], Vec::new())
            }
        }
    }

    /// Validate an edge, resolving endpoint types through the world graph.
    #[must_use]
    pub fn validate_edge(&self, edge: &GraphEdge) -> ValidationResult {
        let Some(schema) = self.schema() else {
            return ValidationResult::from_parts(vec!["Schema unavailable".to_string()], Vec::new());
        };
        let node_type_of: &dyn Fn(&str) -> Option<String> =
            &|id| self.node(id).and_then(|n| n.node_type);
        schema.validate_edge(edge, Some(node_type_of))
    }

    // =========================================================================
    // GRAPH QUERIES
    // =========================================================================

    fn graph(&self) -> Option<&dyn GraphStore> {
        self.world.graph().ok()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph().map_or(0, |g| g.node_count())
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph().map_or(0, |g| g.edge_count())
    }

    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<GraphNode> {
        self.graph()?.node_by_id(node_id)
    }

    #[must_use]
    pub fn neighbors(&self, node_id: &str) -> Vec<String> {
        self.graph().map(|g| g.neighbors(node_id)).unwrap_or_default()
    }

    /// Neighbor ids resolved to node records. Ids without a node are skipped.
    #[must_use]
    pub fn neighbor_nodes(&self, node_id: &str) -> Vec<GraphNode> {
        let Some(graph) = self.graph() else {
            return Vec::new();
        };
        graph
            .neighbors(node_id)
            .iter()
            .filter_map(|id| graph.node_by_id(id))
            .collect()
    }

    #[must_use]
    pub fn nodes_of_type(&self, node_type: &str) -> Vec<GraphNode> {
        self.graph()
            .map(|g| {
                g.nodes()
                    .into_iter()
                    .filter(|n| n.node_type.as_deref() == Some(node_type))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edges with `node_id` as source or target, in graph order.
    #[must_use]
    pub fn edges_of_node(&self, node_id: &str) -> Vec<GraphEdge> {
        self.graph()
            .map(|g| g.edges().into_iter().filter(|e| e.touches(node_id)).collect())
            .unwrap_or_default()
    }

    /// Node ids within `depth` undirected hops of `node_id`.
    #[must_use]
    pub fn expand(&self, node_id: &str, depth: usize) -> Vec<String> {
        self.graph()
            .map(|g| operators::expand(g, node_id, depth))
            .unwrap_or_default()
    }

    // =========================================================================
    // CATALOG LAYER
    // =========================================================================

    fn build_registry(&self) -> Option<CatalogRegistry> {
        let catalogs = match self.world.catalogs() {
            Ok(Some(catalogs)) => catalogs,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "catalogs unavailable");
                return None;
            }
        };
        match CatalogRegistry::from_catalogs(catalogs) {
            Ok(registry) => {
                tracing::debug!(catalogs = registry.len(), "catalog registry built");
                Some(registry)
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog registry not built");
                None
            }
        }
    }

    /// The catalog registry, built on first access.
    #[must_use]
    pub fn registry(&self) -> Option<&CatalogRegistry> {
        self.registry.get_or_init(|| self.build_registry()).as_ref()
    }

    #[must_use]
    pub fn has_catalogs(&self) -> bool {
        self.registry().is_some()
    }

    #[must_use]
    pub fn has_operators(&self) -> bool {
        self.operators().is_some()
    }

    /// Operators over the world graph and the catalog registry.
    #[must_use]
    pub fn operators(&self) -> Option<OperatorEngine<'_>> {
        Some(OperatorEngine::new(self.graph()?, self.registry()?))
    }

    /// Project a node onto a catalog. Empty without catalogs.
    #[must_use]
    pub fn project(
        &self,
        node_id: &str,
        catalog_id: &str,
        options: ProjectOptions,
    ) -> Vec<CatalogEntry> {
        self.operators()
            .map(|ops| ops.project(node_id, catalog_id, options))
            .unwrap_or_default()
    }

    /// Entries of one catalog matching `query`. Empty without catalogs.
    #[must_use]
    pub fn filter(&self, catalog_id: &str, query: &AttrQuery) -> Vec<CatalogEntry> {
        self.registry()
            .map(|registry| OperatorEngine::filter(&registry.entries(catalog_id), query))
            .unwrap_or_default()
    }

    /// Project, then filter. Empty without catalogs.
    #[must_use]
    pub fn project_and_filter(
        &self,
        node_id: &str,
        catalog_id: &str,
        query: &AttrQuery,
        options: ProjectOptions,
    ) -> Vec<CatalogEntry> {
        self.operators()
            .map(|ops| ops.project_and_filter(node_id, catalog_id, query, options))
            .unwrap_or_default()
    }

    // =========================================================================
    // STATISTICS
    // =========================================================================

    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let schema = self.schema();
        EngineStats {
            engine_version: ENGINE_VERSION.to_string(),
            world_name: schema.map(|s| s.name().to_string()).unwrap_or_default(),
            world_version: schema.map(|s| s.version().to_string()).unwrap_or_default(),
            node_type_count: schema.map_or(0, Schema::node_type_count),
            edge_type_count: schema.map_or(0, Schema::edge_type_count),
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            catalogs: self.registry().map(CatalogRegistry::stats),
        }
    }
}

impl<W: World> std::fmt::Debug for Engine<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world_name())
            .field("registry_built", &self.registry.get().is_some())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDefinition;
    use crate::world::{WorldAdapter, WorldInput};
    use crate::{Catalog, CatalogSet, SeedData};
    use serde_json::json;

    fn definition() -> SchemaDefinition {
        SchemaDefinition {
            version: "2.1".into(),
            name: "studio".into(),
            node_types: vec![
                NodeTypeDef::new("scene", "Scene").with_max_count(2),
                NodeTypeDef::new("actor", "Actor"),
            ],
            edge_types: vec![
                EdgeTypeDef::new("casts", "Casts").with_endpoints(&["scene"], &["actor"]),
            ],
            ..SchemaDefinition::default()
        }
    }

    fn seed() -> SeedData {
        SeedData::new(
            vec![
                GraphNode::new("s1", "scene").with_field("tags", json!(["ai"])),
                GraphNode::new("s2", "scene"),
                GraphNode::new("a1", "actor"),
            ],
            vec![GraphEdge::new("s1", "a1", "casts"), GraphEdge::new("s2", "a1", "casts")],
        )
    }

    fn catalogs() -> CatalogSet {
        let mut set = CatalogSet::new();
        set.insert(
            "tools".into(),
            Catalog::new(
                "tools",
                vec![
                    CatalogEntry::new("cursor")
                        .with_field("tags", json!(["ai"]))
                        .with_field("year", json!(2023)),
                    CatalogEntry::new("vim").with_field("year", json!(1991)),
                ],
            ),
        );
        set
    }

    fn engine(with_catalogs: bool) -> Engine<WorldAdapter> {
        let mut input = WorldInput::new(definition()).with_seed(seed());
        if with_catalogs {
            input = input.with_catalogs(catalogs());
        }
        Engine::new(WorldAdapter::new(input).expect("world")).expect("engine")
    }

    #[test]
    fn invalid_world_surfaces_validator_errors() {
        let world = WorldAdapter::new(WorldInput::new(definition())).expect("world");
        let Err(EngineError::InvalidWorld(errors)) = Engine::new(world) else {
            unreachable!("expected invalid world");
        };
        assert!(errors.iter().any(|e| e.starts_with("graph() failed")));
    }

    #[test]
    fn graph_queries_degrade_on_unknown_ids() {
        let engine = engine(false);
        assert_eq!(engine.node_count(), 3);
        assert_eq!(engine.edge_count(), 2);
        assert!(engine.node("ghost").is_none());
        assert!(engine.neighbors("ghost").is_empty());
        assert_eq!(engine.neighbors("a1"), vec!["s1", "s2"]);
        assert_eq!(engine.neighbor_nodes("s1").len(), 1);
        assert_eq!(engine.nodes_of_type("scene").len(), 2);
        assert_eq!(engine.edges_of_node("s2").len(), 1);
        assert_eq!(engine.expand("s1", 2), vec!["a1", "s2"]);
    }

    #[test]
    fn schema_delegation_and_limits() {
        let engine = engine(false);
        assert!(engine.is_valid_node_type("actor"));
        assert!(!engine.is_valid_edge_type("owns"));
        assert!(engine.is_node_type_limit_reached("scene"));
        assert!(!engine.is_node_type_limit_reached("actor"));
        assert!(!engine.is_edge_allowed("casts", "actor", "scene").valid);

        let backwards = GraphEdge::new("a1", "s1", "casts");
        let result = engine.validate_edge(&backwards);
        assert!(!result.valid);
        assert!(result.errors[0].contains("Source type 'actor'"));
    }

    #[test]
    fn catalog_queries_empty_without_catalogs() {
        let engine = engine(false);
        assert!(!engine.has_catalogs());
        assert!(!engine.has_operators());
        assert!(engine.project("s1", "tools", ProjectOptions::default()).is_empty());
        assert!(engine.filter("tools", &AttrQuery::new()).is_empty());
        assert!(engine.stats().catalogs.is_none());
    }

    #[test]
    fn catalog_queries_with_catalogs() {
        let engine = engine(true);
        assert!(engine.has_catalogs());
        assert!(engine.has_operators());

        let projected = engine.project("s1", "tools", ProjectOptions::default());
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].id, "cursor");

        let old = engine.filter("tools", &AttrQuery::new().lt("year", 2000));
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].id, "vim");

        let none = engine.project_and_filter(
            "s1",
            "tools",
            &AttrQuery::new().lt("year", 2000),
            ProjectOptions::default(),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn stats_report_world_and_catalogs() {
        let stats = engine(true).stats();
        assert_eq!(stats.engine_version, ENGINE_VERSION);
        assert_eq!(stats.world_name, "studio");
        assert_eq!(stats.world_version, "2.1");
        assert_eq!(stats.node_type_count, 2);
        assert_eq!(stats.edge_type_count, 1);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.catalogs.map(|c| c.total_entries), Some(2));

        let json = serde_json::to_value(engine(false).stats()).expect("serialize");
        assert!(json.get("catalogs").is_none());
        assert_eq!(json["worldName"], "studio");
    }
}
