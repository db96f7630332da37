//! # World Module
//!
//! The World contract and the adapter that assembles a runnable world from
//! raw inputs.
//!
//! A world bundles a Schema and a Graph with optional seed data, config and
//! catalogs. It is built once and read for the rest of the process; a
//! caller wanting a different graph builds a new world.

use crate::contract::{SchemaValidator, WorldValidator};
use crate::graph::{GraphStore, SeedGraph};
use crate::schema::SchemaDefinition;
use crate::{CatalogSet, EngineError, Schema, SeedData, ValidationResult, WorldConfig};
use serde_json::Value;
use std::fmt;

// =============================================================================
// WORLD TRAIT
// =============================================================================

/// Accessors a world may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorldAccessor {
    Schema,
    Graph,
    Seed,
    Config,
    Catalogs,
}

impl WorldAccessor {
    /// Accessors whose absence is tolerated.
    pub const OPTIONAL: [Self; 3] = [Self::Seed, Self::Config, Self::Catalogs];

    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Graph => "graph",
            Self::Seed => "seed",
            Self::Config => "config",
            Self::Catalogs => "catalogs",
        }
    }
}

impl fmt::Display for WorldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.method_name())
    }
}

/// The World contract the engine validates and serves.
///
/// `schema` and `graph` are required and may fail; the validator reports
/// such failures instead of propagating them. The remaining accessors are
/// optional: a world declares which of them it provides through
/// `provides`, and the validator warns about the rest.
pub trait World {
    fn schema(&self) -> Result<&Schema, EngineError>;

    fn graph(&self) -> Result<&dyn GraphStore, EngineError>;

    /// Whether the world implements `accessor`. Required accessors are
    /// always provided.
    fn provides(&self, accessor: WorldAccessor) -> bool {
        matches!(accessor, WorldAccessor::Schema | WorldAccessor::Graph)
    }

    fn seed(&self) -> Option<&SeedData> {
        None
    }

    fn config(&self) -> Option<&WorldConfig> {
        None
    }

    /// The world's catalogs. `Ok(None)` means the world simply has none.
    fn catalogs(&self) -> Result<Option<&CatalogSet>, EngineError> {
        Ok(None)
    }
}

// =============================================================================
// WORLD INPUT
// =============================================================================

/// Raw inputs a [`WorldAdapter`] assembles a world from.
#[derive(Default)]
pub struct WorldInput {
    pub schema_data: Option<SchemaDefinition>,
    pub seed_data: Option<SeedData>,
    pub config: Option<WorldConfig>,
    pub graph: Option<Box<dyn GraphStore>>,
    pub catalogs: Option<CatalogSet>,
}

impl WorldInput {
    #[must_use]
    pub fn new(schema_data: SchemaDefinition) -> Self {
        Self {
            schema_data: Some(schema_data),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: SeedData) -> Self {
        self.seed_data = Some(seed);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: WorldConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn with_graph(mut self, graph: Box<dyn GraphStore>) -> Self {
        self.graph = Some(graph);
        self
    }

    #[must_use]
    pub fn with_catalogs(mut self, catalogs: CatalogSet) -> Self {
        self.catalogs = Some(catalogs);
        self
    }
}

impl fmt::Debug for WorldInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldInput")
            .field("schema_data", &self.schema_data.is_some())
            .field("seed_data", &self.seed_data.is_some())
            .field("config", &self.config.is_some())
            .field("graph", &self.graph.is_some())
            .field("catalogs", &self.catalogs.as_ref().map(|c| c.len()))
            .finish()
    }
}

// =============================================================================
// WORLD ADAPTER
// =============================================================================

/// Assembles Schema, graph, seed, config and catalogs into a [`World`].
///
/// When no graph is supplied but seed data is, the adapter derives a
/// [`SeedGraph`] with node-id and undirected adjacency indexes.
pub struct WorldAdapter {
    schema: Schema,
    graph: Option<Box<dyn GraphStore>>,
    seed: Option<SeedData>,
    config: Option<WorldConfig>,
    catalogs: Option<CatalogSet>,
}

impl WorldAdapter {
    /// Assemble a world. Fails if no schema data was supplied.
    pub fn new(input: WorldInput) -> Result<Self, EngineError> {
        let schema_data = input.schema_data.ok_or(EngineError::MissingSchemaData)?;
        let schema = Schema::new(schema_data);

        let graph = match (input.graph, &input.seed_data) {
            (Some(graph), _) => Some(graph),
            (None, Some(seed)) => Some(Box::new(SeedGraph::from_seed(seed)) as Box<dyn GraphStore>),
            (None, None) => None,
        };

        tracing::debug!(
            schema = schema.name(),
            has_graph = graph.is_some(),
            catalogs = input.catalogs.as_ref().map_or(0, |c| c.len()),
            "world assembled"
        );

        Ok(Self {
            schema,
            graph,
            seed: input.seed_data,
            config: input.config,
            catalogs: input.catalogs,
        })
    }

    /// Assemble a world from a raw document
    /// `{ schema, seed?, config?, catalogs? }`.
    ///
    /// The schema's raw shape is checked before it is deserialized; catalogs
    /// here must already be inline catalog objects (use the catalog loader
    /// for path references).
    pub fn from_json(document: &Value) -> Result<Self, EngineError> {
        let schema_value = document.get("schema").unwrap_or(&Value::Null);
        if schema_value.is_null() {
            return Err(EngineError::MissingSchemaData);
        }
        let shape = SchemaValidator::validate_json(schema_value);
        if !shape.valid {
            return Err(EngineError::InvalidWorld(shape.errors));
        }

        let mut input = WorldInput::new(serde_json::from_value(schema_value.clone())?);
        if let Some(seed) = document.get("seed").filter(|v| !v.is_null()) {
            input.seed_data = Some(serde_json::from_value(seed.clone())?);
        }
        if let Some(config) = document.get("config").filter(|v| !v.is_null()) {
            input.config = Some(serde_json::from_value(config.clone())?);
        }
        if let Some(catalogs) = document.get("catalogs").filter(|v| !v.is_null()) {
            let shape = crate::contract::CatalogValidator::validate_json(catalogs);
            if !shape.valid {
                return Err(EngineError::InvalidCatalogSet(shape.errors));
            }
            input.catalogs = Some(serde_json::from_value(catalogs.clone())?);
        }
        Self::new(input)
    }

    /// A world with no types and an empty seed.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(Schema::empty())
    }

    /// A world with one node type, one edge type and an empty seed.
    #[must_use]
    pub fn minimal() -> Self {
        Self::from_parts(Schema::minimal())
    }

    fn from_parts(schema: Schema) -> Self {
        let seed = SeedData::empty();
        Self {
            schema,
            graph: Some(Box::new(SeedGraph::from_seed(&seed))),
            seed: Some(seed),
            config: Some(WorldConfig::default()),
            catalogs: None,
        }
    }

    /// Run the World contract validator against this world.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        WorldValidator::validate(self)
    }
}

impl World for WorldAdapter {
    fn schema(&self) -> Result<&Schema, EngineError> {
        Ok(&self.schema)
    }

    fn graph(&self) -> Result<&dyn GraphStore, EngineError> {
        self.graph.as_deref().ok_or(EngineError::MissingGraph)
    }

    fn provides(&self, _accessor: WorldAccessor) -> bool {
        true
    }

    fn seed(&self) -> Option<&SeedData> {
        self.seed.as_ref()
    }

    fn config(&self) -> Option<&WorldConfig> {
        self.config.as_ref()
    }

    fn catalogs(&self) -> Result<Option<&CatalogSet>, EngineError> {
        Ok(self.catalogs.as_ref())
    }
}

impl fmt::Debug for WorldAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldAdapter")
            .field("schema", &self.schema.name())
            .field("has_graph", &self.graph.is_some())
            .field("has_seed", &self.seed.is_some())
            .field("catalogs", &self.catalogs.as_ref().map(|c| c.len()))
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphEdge, GraphNode};
    use serde_json::json;

    #[test]
    fn missing_schema_data_fails() {
        let result = WorldAdapter::new(WorldInput::default());
        assert!(matches!(result, Err(EngineError::MissingSchemaData)));

        let result = WorldAdapter::from_json(&json!({"seed": {}}));
        assert!(matches!(result, Err(EngineError::MissingSchemaData)));
    }

    #[test]
    fn graph_derived_from_seed() {
        let seed = SeedData::new(
            vec![GraphNode::new("a", "node"), GraphNode::new("b", "node")],
            vec![GraphEdge::new("a", "b", "link")],
        );
        let world = WorldAdapter::new(
            WorldInput::new(Schema::minimal().definition().clone()).with_seed(seed),
        )
        .expect("world");

        let graph = world.graph().expect("graph");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.neighbors("b"), vec!["a"]);
    }

    #[test]
    fn graph_accessor_fails_without_graph_or_seed() {
        let world = WorldAdapter::new(WorldInput::new(Schema::minimal().definition().clone()))
            .expect("world");
        assert!(matches!(world.graph(), Err(EngineError::MissingGraph)));
        assert!(!world.validate().valid);
    }

    #[test]
    fn factory_worlds_validate() {
        let empty = WorldAdapter::empty().validate();
        assert!(empty.valid, "{:?}", empty.errors);
        assert!(empty.errors.is_empty());

        let minimal = WorldAdapter::minimal().validate();
        assert!(minimal.valid, "{:?}", minimal.errors);
    }

    #[test]
    fn from_json_reads_every_section() {
        let world = WorldAdapter::from_json(&json!({
            "schema": {
                "version": "1", "name": "cosmos",
                "nodeTypes": [{"id": "galaxy", "label": "Galaxy"}],
                "edgeTypes": []
            },
            "seed": {"nodes": [{"id": "milky-way", "type": "galaxy"}]},
            "config": {"theme": "dark"},
            "catalogs": {"stars": {"id": "stars", "entries": [{"id": "sol"}]}}
        }))
        .expect("world");

        assert_eq!(world.schema().expect("schema").name(), "cosmos");
        assert_eq!(world.config().and_then(|c| c.get_str("theme")), Some("dark"));
        assert_eq!(world.catalogs().expect("catalogs").map(|c| c.len()), Some(1));
        assert!(world.validate().valid);
    }

    #[test]
    fn from_json_rejects_malformed_schema() {
        let result = WorldAdapter::from_json(&json!({"schema": {"name": "x"}}));
        let Err(EngineError::InvalidWorld(errors)) = result else {
            unreachable!("expected invalid world");
        };
        assert!(errors.iter().any(|e| e.contains("version")));
    }
}
