//! # Contract Tier Tests (T0-T3)
//!
//! End-to-end checks through the public API only.
//!
//! ## Tiers
//! - T0: Schema Rules
//! - T1: Projection
//! - T2: Filtering and Expansion
//! - T3: Loading and the Engine Facade

use meaning_core::{
    AttrQuery, Catalog, CatalogEntry, CatalogLoader, CatalogRegistry, CatalogSet, Engine,
    EngineError, GraphEdge, GraphNode, LoadError, OperatorEngine, ProjectOptions, Schema, SeedData,
    SeedGraph, WorldAdapter, WorldInput, WorldValidator,
};
use serde_json::{Value, json};

fn tree_schema() -> Schema {
    Schema::from_json(&json!({
        "version": "1.0.0",
        "name": "tree",
        "nodeTypes": [{"id": "root", "label": "Root"}],
        "edgeTypes": [{
            "id": "contains",
            "label": "Contains",
            "allowedSourceTypes": ["root"],
            "allowedTargetTypes": ["root"]
        }]
    }))
    .expect("schema")
}

fn tools_catalog() -> Catalog {
    serde_json::from_value(json!({
        "id": "tools",
        "entries": [
            {"id": "vscode", "tags": ["editor", "free"]},
            {"id": "cursor", "tags": ["editor", "ai"]}
        ]
    }))
    .expect("catalog")
}

fn lookup(nodes: &[GraphNode]) -> impl Fn(&str) -> Option<String> + '_ {
    move |id| {
        nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.node_type.clone())
    }
}

// =============================================================================
// TIER T0: SCHEMA RULES
// =============================================================================

mod t0_schema_rules {
    use super::*;

    /// T0.1: An edge between allowed endpoint types is valid.
    #[test]
    fn allowed_edge_is_valid() {
        let schema = tree_schema();
        let nodes = vec![GraphNode::new("a", "root"), GraphNode::new("b", "root")];
        let node_type_of = lookup(&nodes);

        let edge = GraphEdge::new("a", "b", "contains");
        let result = schema.validate_edge(&edge, Some(&node_type_of));
        assert!(result.valid, "{:?}", result.errors);
    }

    /// T0.2: An unknown edge type is reported.
    #[test]
    fn unknown_edge_type_is_invalid() {
        let schema = tree_schema();
        let nodes = vec![GraphNode::new("a", "root"), GraphNode::new("b", "root")];
        let node_type_of = lookup(&nodes);

        let edge = GraphEdge::new("a", "b", "unknown");
        let result = schema.validate_edge(&edge, Some(&node_type_of));
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("Invalid edge type")));
    }

    /// T0.3: Factory worlds always satisfy the World contract.
    #[test]
    fn factory_worlds_are_valid() {
        for world in [WorldAdapter::empty(), WorldAdapter::minimal()] {
            let result = WorldValidator::validate(&world);
            assert!(result.valid);
            assert!(result.errors.is_empty());
        }
    }
}

// =============================================================================
// TIER T1: PROJECTION
// =============================================================================

mod t1_projection {
    use super::*;

    fn setup(node: GraphNode, catalog: Catalog) -> (SeedGraph, CatalogRegistry) {
        let graph = SeedGraph::from_seed(&SeedData::new(vec![node], Vec::new()));
        let mut registry = CatalogRegistry::new();
        registry.load("tools", catalog).expect("load");
        (graph, registry)
    }

    /// T1.1: Tag projection returns matching entries in registry order.
    #[test]
    fn tag_projection_in_registry_order() {
        let node = GraphNode::new("n1", "root").with_field("tags", json!(["editor"]));
        let (graph, registry) = setup(node, tools_catalog());
        let ops = OperatorEngine::new(&graph, &registry);

        let projected = ops.project("n1", "tools", ProjectOptions::tags_only());
        let ids: Vec<_> = projected.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["vscode", "cursor"]);
    }

    /// T1.2: Pointer tags project through their stripped form.
    #[test]
    fn pointer_tag_projection() {
        let node = GraphNode::new("n2", "root").with_field("pointerTags", json!(["cap:ai"]));
        let (graph, registry) = setup(node, tools_catalog());
        let ops = OperatorEngine::new(&graph, &registry);

        let projected = ops.project("n2", "tools", ProjectOptions::default());
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].id, "cursor");
    }
}

// =============================================================================
// TIER T2: FILTERING AND EXPANSION
// =============================================================================

mod t2_filter_expand {
    use super::*;

    /// T2.1: Range filters keep original order.
    #[test]
    fn gte_filter() {
        let entries: Vec<CatalogEntry> = [2014, 2019, 2020]
            .iter()
            .map(|year| CatalogEntry::new(format!("e{year}")).with_field("year", json!(year)))
            .collect();

        let query = AttrQuery::from_json(&json!({"year": {"$gte": 2019}})).expect("query");
        let kept = OperatorEngine::filter(&entries, &query);
        let ids: Vec<_> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e2019", "e2020"]);
    }

    /// T2.2: Expansion terminates on cycles and never returns the origin.
    #[test]
    fn expansion_on_cycle() {
        let seed = SeedData::new(
            vec![
                GraphNode::new("a", "root"),
                GraphNode::new("b", "root"),
                GraphNode::new("c", "root"),
            ],
            vec![
                GraphEdge::new("a", "b", "contains"),
                GraphEdge::new("b", "c", "contains"),
                GraphEdge::new("c", "a", "contains"),
            ],
        );
        let graph = SeedGraph::from_seed(&seed);
        let registry = CatalogRegistry::new();
        let ops = OperatorEngine::new(&graph, &registry);

        assert!(ops.expand("a", 0).is_empty());
        let reached = ops.expand("a", 10);
        assert_eq!(reached.len(), 2);
        assert!(!reached.contains(&"a".to_string()));
    }
}

// =============================================================================
// TIER T3: LOADING AND THE ENGINE FACADE
// =============================================================================

mod t3_loading_engine {
    use super::*;

    /// T3.1: Mixed inline and path catalogs load; reserved keys are skipped.
    #[test]
    fn registry_description_loads() {
        let description = json!({
            "$schema": "registry.schema.json",
            "tools": "./catalogs/tools.json",
            "ai": {"id": "ai", "entries": [{"id": "gpt"}]}
        });
        let resolver = |path: &str| -> Result<Value, LoadError> {
            if path == "base/catalogs/tools.json" {
                serde_json::to_value(tools_catalog()).map_err(|e| LoadError::Other(e.to_string()))
            } else {
                Err(LoadError::NotFound(path.to_string()))
            }
        };

        let loaded = CatalogLoader::with_base_path("base").load(&description, &resolver);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains_key("tools"));
        assert!(loaded.contains_key("ai"));
        assert!(!loaded.contains_key("$schema"));
    }

    /// T3.2: A JSON world runs through the engine end to end.
    #[test]
    fn engine_over_json_world() {
        let world = WorldAdapter::from_json(&json!({
            "schema": {
                "version": "1.0.0",
                "name": "tree",
                "nodeTypes": [{"id": "root", "label": "Root"}],
                "edgeTypes": [{"id": "contains", "label": "Contains"}]
            },
            "seed": {
                "nodes": [
                    {"id": "a", "type": "root", "tags": ["editor"]},
                    {"id": "b", "type": "root", "catalogRefs": {"tools": ["cursor"]}}
                ],
                "edges": [{"source": "a", "target": "b", "type": "contains"}]
            },
            "catalogs": {"tools": serde_json::to_value(tools_catalog()).expect("json")}
        }))
        .expect("world");

        let engine = Engine::new(world).expect("engine");
        assert!(engine.has_operators());
        assert_eq!(engine.project("a", "tools", ProjectOptions::default()).len(), 2);
        assert_eq!(engine.project("b", "tools", ProjectOptions::refs_only())[0].id, "cursor");
        assert_eq!(engine.stats().catalogs.map(|c| c.catalog_count), Some(1));
    }

    /// T3.3: An invalid world never produces an engine.
    #[test]
    fn invalid_world_rejected() {
        let world = WorldAdapter::from_json(&json!({
            "schema": {"version": "1", "name": "x", "nodeTypes": [], "edgeTypes": []},
            "seed": {"nodes": [{"id": "a", "type": "planet"}]}
        }))
        .expect("world");

        let err = Engine::new(world).expect_err("invalid");
        assert!(err.to_string().contains("invalid type: planet"));
    }

    fn world_with(nodes: Vec<GraphNode>, catalogs: CatalogSet) -> WorldAdapter {
        let input = WorldInput::new(tree_schema().definition().clone())
            .with_seed(SeedData::new(nodes, Vec::new()))
            .with_catalogs(catalogs);
        WorldAdapter::new(input).expect("world")
    }

    /// T3.4: Malformed catalogs handed to a world block the engine.
    #[test]
    fn invalid_catalogs_reject_engine() {
        let nodes = vec![GraphNode::new("a", "root")];

        let mismatched = CatalogSet::from([("tools".to_string(), Catalog::new("other", vec![]))]);
        let expected = vec!["Catalogs: Catalog id 'other' does not match registry key 'tools'"];
        let err = Engine::new(world_with(nodes.clone(), mismatched)).expect_err("invalid");
        assert!(matches!(
            err,
            EngineError::InvalidWorld(ref errors) if *errors == expected
        ));

        let bad_schema = CatalogSet::from([(
            "tools".to_string(),
            tools_catalog().with_schema(json!(["not", "an", "object"])),
        )]);
        let expected = vec!["Catalogs: Catalog 'tools' schema must be an object"];
        let err = Engine::new(world_with(nodes, bad_schema)).expect_err("invalid");
        assert!(matches!(
            err,
            EngineError::InvalidWorld(ref errors) if *errors == expected
        ));
    }

    /// T3.5: Malformed catalogRefs are errors; unknown references only warn.
    #[test]
    fn catalog_refs_cross_check_gates_engine() {
        let catalogs = CatalogSet::from([("tools".to_string(), tools_catalog())]);

        let scalar_refs =
            GraphNode::new("a", "root").with_field("catalogRefs", json!({"tools": "cursor"}));
        let expected = vec!["Catalogs: Node 'a' catalogRefs.tools must be a sequence"];
        let err = Engine::new(world_with(vec![scalar_refs], catalogs.clone()))
            .expect_err("invalid");
        assert!(matches!(
            err,
            EngineError::InvalidWorld(ref errors) if *errors == expected
        ));

        let unknown_refs = GraphNode::new("a", "root")
            .with_field("catalogRefs", json!({"tools": ["ghost"], "langs": ["rust"]}));
        let world = world_with(vec![unknown_refs], catalogs);
        let report = world.validate();
        assert!(report.valid, "{:?}", report.errors);
        assert!(report.warnings.iter().any(|w| w.contains("unknown entry \"ghost\"")));
        assert!(report.warnings.iter().any(|w| w.contains("unknown catalog 'langs'")));
        assert!(Engine::new(world).is_ok());
    }
}
