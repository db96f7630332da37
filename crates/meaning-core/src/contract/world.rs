//! World contract: orchestrates the schema, graph and catalog checks.

use super::{CatalogValidator, GraphValidator, SchemaValidator};
use crate::graph::GraphCapability;
use crate::world::{World, WorldAccessor};
use crate::ValidationResult;

/// Validates a complete world.
pub struct WorldValidator;

impl WorldValidator {
    /// Validate a world.
    ///
    /// Each accessor is read inside its own failure boundary: a failing
    /// accessor is reported as an error naming it, and no checks run
    /// against the piece it failed to produce. Missing optional accessors
    /// only add warnings.
    #[must_use]
    pub fn validate<W: World + ?Sized>(world: &W) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let schema = match world.schema() {
            Ok(schema) => Some(schema),
            Err(err) => {
                result.error(format!("{}() failed: {err}", WorldAccessor::Schema.method_name()));
                None
            }
        };

        let graph = match world.graph() {
            Ok(graph) => Some(graph),
            Err(err) => {
                result.error(format!("{}() failed: {err}", WorldAccessor::Graph.method_name()));
                None
            }
        };

        if let Some(schema) = schema {
            result.merge_with_context("Schema", SchemaValidator::validate(schema));
        }
        if let Some(graph) = graph {
            result.merge_with_context("Graph", GraphValidator::validate(graph));
        }
        if let (Some(schema), Some(graph)) = (schema, graph) {
            result.merge_with_context(
                "Graph",
                GraphValidator::validate_against_schema(graph, schema),
            );
        }

        for accessor in WorldAccessor::OPTIONAL {
            if !world.provides(accessor) {
                result.warn(format!("World does not provide {accessor}"));
            }
        }

        if world.provides(WorldAccessor::Catalogs) {
            match world.catalogs() {
                Err(err) => {
                    result.error(format!(
                        "{}() failed: {err}",
                        WorldAccessor::Catalogs.method_name()
                    ));
                }
                Ok(None) => {}
                Ok(Some(catalogs)) => {
                    result.merge_with_context("Catalogs", CatalogValidator::validate(catalogs));
                    if let Some(graph) = graph.filter(|g| g.supports(GraphCapability::Nodes)) {
                        result.merge_with_context(
                            "Catalogs",
                            CatalogValidator::validate_catalog_refs(&graph.nodes(), catalogs),
                        );
                    }
                }
            }
        }

        tracing::debug!(
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "world validated"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, SeedGraph};
    use crate::{CatalogSet, EngineError, Schema, SeedData};

    /// A bare world exposing only the required accessors.
    struct BareWorld {
        schema: Schema,
        graph: SeedGraph,
    }

    impl World for BareWorld {
        fn schema(&self) -> Result<&Schema, EngineError> {
            Ok(&self.schema)
        }
        fn graph(&self) -> Result<&dyn GraphStore, EngineError> {
            Ok(&self.graph)
        }
    }

    /// A world whose schema and catalogs accessors both fail.
    struct BrokenWorld {
        graph: SeedGraph,
    }

    impl World for BrokenWorld {
        fn schema(&self) -> Result<&Schema, EngineError> {
            Err(EngineError::MissingSchema)
        }
        fn graph(&self) -> Result<&dyn GraphStore, EngineError> {
            Ok(&self.graph)
        }
        fn provides(&self, _accessor: WorldAccessor) -> bool {
            true
        }
        fn catalogs(&self) -> Result<Option<&CatalogSet>, EngineError> {
            Err(EngineError::AccessorFailed {
                accessor: "catalogs",
                reason: "backing store offline".into(),
            })
        }
    }

    #[test]
    fn missing_optional_accessors_only_warn() {
        let world = BareWorld {
            schema: Schema::minimal(),
            graph: SeedGraph::from_seed(&SeedData::empty()),
        };
        let result = WorldValidator::validate(&world);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings.iter().any(|w| w.contains("catalogs()")));
    }

    #[test]
    fn failing_accessors_named_and_isolated() {
        let world = BrokenWorld {
            graph: SeedGraph::from_seed(&SeedData::empty()),
        };
        let result = WorldValidator::validate(&world);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.starts_with("schema() failed")));
        assert!(result.errors.iter().any(|e| e.starts_with("catalogs() failed")));
        // Graph checks still ran, and nothing else was reported.
        assert_eq!(result.errors.len(), 2);
    }
}
